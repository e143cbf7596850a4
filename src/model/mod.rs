// MODEL: Scene data
pub mod camera;
pub mod height_map;
pub mod scene;

pub use camera::Camera;
pub use height_map::{HeightMap, TERRACED_HILL};
pub use scene::{compose_cubes, CubeInstance, CubeKind, Scene, SceneStyle};
