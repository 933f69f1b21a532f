//! Opaque handles to GPU resources created by a rendering context.
//!
//! The compiler never looks inside a resource. It only needs identity (two
//! handles are equal when they point at the same allocation), the image size for
//! dimension uniforms and a way to destroy it once the last user released it.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub trait GpuResource: Debug + Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn destroy(&self);
}

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<dyn GpuResource>);

        impl $name {
            pub fn new(resource: impl GpuResource + 'static) -> Self {
                Self(Arc::new(resource))
            }

            pub fn from_arc(resource: Arc<dyn GpuResource>) -> Self {
                Self(resource)
            }

            pub fn width(&self) -> u32 {
                self.0.width()
            }

            pub fn height(&self) -> u32 {
                self.0.height()
            }

            pub fn destroy(&self) {
                self.0.destroy()
            }

            pub fn inner(&self) -> &Arc<dyn GpuResource> {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
            }
        }

        impl Eq for $name {}

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }
    };
}

resource_handle!(
    /// A 2D texture owned by the rendering context.
    Texture
);

resource_handle!(
    /// A cube map owned by the rendering context.
    CubeMap
);

/// Six cube faces in the fixed `+X, -X, +Y, -Y, +Z, -Z` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeFaces<T> {
    pub positive_x: T,
    pub negative_x: T,
    pub positive_y: T,
    pub negative_y: T,
    pub positive_z: T,
    pub negative_z: T,
}

impl<T> CubeFaces<T> {
    pub const KEYS: [&'static str; 6] = [
        "positiveX",
        "negativeX",
        "positiveY",
        "negativeY",
        "positiveZ",
        "negativeZ",
    ];

    pub fn from_array(faces: [T; 6]) -> Self {
        let [
            positive_x,
            negative_x,
            positive_y,
            negative_y,
            positive_z,
            negative_z,
        ] = faces;
        Self {
            positive_x,
            negative_x,
            positive_y,
            negative_y,
            positive_z,
            negative_z,
        }
    }

    pub fn into_array(self) -> [T; 6] {
        [
            self.positive_x,
            self.negative_x,
            self.positive_y,
            self.negative_y,
            self.positive_z,
            self.negative_z,
        ]
    }

    pub fn as_array(&self) -> [&T; 6] {
        [
            &self.positive_x,
            &self.negative_x,
            &self.positive_y,
            &self.negative_y,
            &self.positive_z,
            &self.negative_z,
        ]
    }
}

impl CubeFaces<String> {
    /// Cache key of a cube map: the six face paths concatenated in face order.
    pub fn key(&self) -> String {
        self.as_array().into_iter().map(String::as_str).collect()
    }
}
