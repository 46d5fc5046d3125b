/// Initialization parameters for the GPU backend.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter preference passed to wgpu.
    pub power_preference: wgpu::PowerPreference,

    /// Size of the offscreen colour target in physical pixels.
    pub target_size: (u32, u32),

    /// Colour target format.
    ///
    /// sRGB is typically required for correct colour output.
    pub target_format: wgpu::TextureFormat,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            target_size: (400, 400),
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
