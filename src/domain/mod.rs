mod container;
pub mod platform;
pub mod recipe;
pub mod traits;

pub use container::{BuildRequest, Container, ContainerSpec, ContainerState, port_mapping};
pub use platform::{HostArch, Platform};
pub use recipe::ImageRecipe;
pub use traits::ContainerEngine;
