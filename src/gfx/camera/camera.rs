use cgmath::{
    ortho, perspective, Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Quaternion,
    Rad, Rotation, SquareMatrix, Vector3,
};
use thiserror::Error;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const DEFAULT_ZNEAR: f32 = 0.1;
const DEFAULT_ZFAR: f32 = 100.0;

/// Errors for degenerate camera parameters, rejected at construction
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("viewport dimensions must be non-zero (got {width}x{height})")]
    DegenerateViewport { width: u32, height: u32 },

    #[error("orthographic extents must be positive (got {width}x{height})")]
    DegenerateExtents { width: f32, height: f32 },

    #[error("vertical fov must lie in (0, 180) degrees (got {fovy})")]
    DegenerateFov { fovy: f32 },

    #[error("near plane {near} must be positive and closer than far plane {far}")]
    DegenerateDepthRange { near: f32, far: f32 },
}

/// Projection parameters for a [`Camera`]
///
/// Perspective cameras track the viewport aspect ratio and follow window
/// resizes. Orthographic extents are fixed at construction and ignore the
/// viewport entirely (shadow-light cameras rely on this).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fovy: Rad<f32>,
        aspect: f32,
        znear: f32,
        zfar: f32,
    },
    Orthographic {
        width: f32,
        height: f32,
        znear: f32,
        zfar: f32,
    },
}

/// Camera uniform data shared with shaders
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }
}

/// A camera with explicit pose and derived view/projection matrices
///
/// The view matrix is the inverse of the camera's world transform. The
/// combined matrix is `projection * view` (with the wgpu depth-range
/// correction folded into the projection) and is only valid after
/// [`update_matrix`](Camera::update_matrix) has run for the current pose.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub orientation: Quaternion<f32>,
    projection: Projection,
    proj: Matrix4<f32>,
    view: Matrix4<f32>,
    combined: Matrix4<f32>,
}

impl Camera {
    /// Creates a perspective camera for the given viewport
    ///
    /// Uses the default near/far planes (0.1 / 100.0). Fails on a zero-sized
    /// viewport or an out-of-range vertical fov.
    pub fn perspective(
        viewport_width: u32,
        viewport_height: u32,
        fovy_degrees: f32,
    ) -> Result<Self, CameraError> {
        if viewport_width == 0 || viewport_height == 0 {
            return Err(CameraError::DegenerateViewport {
                width: viewport_width,
                height: viewport_height,
            });
        }
        if fovy_degrees <= 0.0 || fovy_degrees >= 180.0 {
            return Err(CameraError::DegenerateFov { fovy: fovy_degrees });
        }

        let projection = Projection::Perspective {
            fovy: Rad::from(Deg(fovy_degrees)),
            aspect: viewport_width as f32 / viewport_height as f32,
            znear: DEFAULT_ZNEAR,
            zfar: DEFAULT_ZFAR,
        };
        Ok(Self::from_projection(projection))
    }

    /// Creates an orthographic camera with a box centered on the view axis
    ///
    /// Extents span ±width/2 and ±height/2. The extents are independent of
    /// the viewport and never change on resize.
    pub fn orthographic(
        width: f32,
        height: f32,
        znear: f32,
        zfar: f32,
    ) -> Result<Self, CameraError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(CameraError::DegenerateExtents { width, height });
        }
        if znear >= zfar {
            return Err(CameraError::DegenerateDepthRange {
                near: znear,
                far: zfar,
            });
        }

        let projection = Projection::Orthographic {
            width,
            height,
            znear,
            zfar,
        };
        Ok(Self::from_projection(projection))
    }

    fn from_projection(projection: Projection) -> Self {
        let mut camera = Self {
            position: Point3::origin(),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            projection,
            proj: Matrix4::identity(),
            view: Matrix4::identity(),
            combined: Matrix4::identity(),
        };
        camera.rebuild_projection();
        camera.update_matrix();
        camera
    }

    fn rebuild_projection(&mut self) {
        let raw = match self.projection {
            Projection::Perspective {
                fovy,
                aspect,
                znear,
                zfar,
            } => perspective(fovy, aspect, znear, zfar),
            Projection::Orthographic {
                width,
                height,
                znear,
                zfar,
            } => ortho(
                -width / 2.0,
                width / 2.0,
                -height / 2.0,
                height / 2.0,
                znear,
                zfar,
            ),
        };
        self.proj = OPENGL_TO_WGPU_MATRIX * raw;
    }

    /// Recomputes the view and combined matrices from the current pose
    ///
    /// Must be called after any pose mutation and before a render pass reads
    /// the camera. Calling it twice without intervening changes yields the
    /// same matrices.
    pub fn update_matrix(&mut self) {
        let rotation = Matrix4::from(self.orientation.invert());
        let translation = Matrix4::from_translation(-self.position.to_vec());
        self.view = rotation * translation;
        self.combined = self.proj * self.view;
    }

    /// Applies a viewport resize
    ///
    /// Perspective cameras update their aspect ratio; orthographic extents
    /// are fixed and unaffected. Zero dimensions are ignored (transient
    /// minimized-window states).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Projection::Perspective { ref mut aspect, .. } = self.projection {
            *aspect = width as f32 / height as f32;
            self.rebuild_projection();
            self.update_matrix();
        }
    }

    /// Orients the camera towards `target`
    ///
    /// `up` must not be parallel to the view direction.
    pub fn look_at(&mut self, target: Point3<f32>, up: Vector3<f32>) {
        let forward = (target - self.position).normalize();
        let side = forward.cross(up).normalize();
        let local_up = side.cross(forward);
        self.orientation = Quaternion::from(Matrix3::from_cols(side, local_up, -forward));
    }

    /// The direction the camera is facing (local -Z in world space)
    pub fn view_dir(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(-Vector3::unit_z())
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.proj
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    /// The combined projection×view matrix from the last `update_matrix`
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.combined
    }

    /// Shader-facing uniform for the current matrices
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: [self.position.x, self.position.y, self.position.z, 1.0],
            view_proj: self.combined.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    #[test]
    fn test_perspective_rejects_zero_viewport() {
        assert!(Camera::perspective(0, 720, 60.0).is_err());
        assert!(Camera::perspective(1280, 0, 60.0).is_err());
    }

    #[test]
    fn test_perspective_rejects_bad_fov() {
        assert!(Camera::perspective(1280, 720, 0.0).is_err());
        assert!(Camera::perspective(1280, 720, 180.0).is_err());
    }

    #[test]
    fn test_orthographic_rejects_degenerate_parameters() {
        assert!(Camera::orthographic(0.0, 16.0, 1.0, 50.0).is_err());
        assert!(Camera::orthographic(16.0, 16.0, 50.0, 1.0).is_err());
        assert!(Camera::orthographic(16.0, 16.0, 5.0, 5.0).is_err());
    }

    #[test]
    fn test_update_matrix_is_idempotent() {
        let mut camera = Camera::perspective(1280, 720, 60.0).unwrap();
        camera.position = Point3::new(1.0, 2.0, 3.0);
        camera.update_matrix();
        let first = camera.view_projection();
        camera.update_matrix();
        assert_eq!(first, camera.view_projection());
    }

    #[test]
    fn test_view_matrix_inverts_translation() {
        let mut camera = Camera::perspective(1280, 720, 60.0).unwrap();
        camera.position = Point3::new(0.0, 0.0, 5.0);
        camera.update_matrix();
        let view = camera.view_matrix();
        assert_near(view[3][0], 0.0);
        assert_near(view[3][1], 0.0);
        assert_near(view[3][2], -5.0);
    }

    #[test]
    fn test_default_view_dir_is_negative_z() {
        let camera = Camera::perspective(1280, 720, 60.0).unwrap();
        let dir = camera.view_dir();
        assert_near(dir.x, 0.0);
        assert_near(dir.y, 0.0);
        assert_near(dir.z, -1.0);
    }

    #[test]
    fn test_resize_updates_aspect_only() {
        let mut camera = Camera::perspective(1280, 720, 60.0).unwrap();
        let before = camera.projection_matrix();

        camera.resize(800, 600);
        let after = camera.projection_matrix();

        // Focal term (fov) unchanged, x scaling follows the new aspect ratio
        assert_near(after[1][1], before[1][1]);
        assert_near(after[0][0], after[1][1] / (800.0 / 600.0));
        assert_near(before[0][0], before[1][1] / (1280.0 / 720.0));
    }

    #[test]
    fn test_orthographic_ignores_resize() {
        let mut camera = Camera::orthographic(16.0, 16.0, 1.0, 50.0).unwrap();
        let before = camera.view_projection();

        camera.resize(640, 480);
        camera.resize(3840, 2160);

        assert_eq!(before, camera.view_projection());
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut camera = Camera::orthographic(16.0, 16.0, 1.0, 50.0).unwrap();
        camera.position = Point3::new(10.0, 0.0, 0.0);
        camera.look_at(Point3::origin(), Vector3::unit_y());
        let dir = camera.view_dir();
        assert_near(dir.x, -1.0);
        assert_near(dir.y, 0.0);
        assert_near(dir.z, 0.0);
    }
}
