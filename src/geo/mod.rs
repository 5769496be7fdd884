pub mod layout;
pub mod projection;
pub mod topology;

pub use layout::{ContainerSize, GeometryProvider, MapLayout, ProvinceLabel, Region, RegionMap, RegionShape};
pub use projection::Mercator;
pub use topology::{RegionFeature, Topology};
