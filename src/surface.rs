use wgpu::InstanceDescriptor;

use crate::error::{Error, Result};

mod readback;

use readback::readback_buffer_size;

/// Format of the color attachment. Linear so that a clear with `1.0` reads
/// back as `255` and `0.5` as `128`.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// An off-screen render target of fixed size backed by a headless GPU device.
///
/// The surface owns its device, queue and textures. Dropping it destroys the
/// GPU textures, so a surface created inside a test is released even when the
/// test panics.
pub struct DrawingSurface {
    // Kept alive for as long as the device is in use.
    _instance: wgpu::Instance,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    physical_size: (u32, u32),
    pub(crate) color_texture: wgpu::Texture,
    pub(crate) color_view: wgpu::TextureView,
    pub(crate) depth_stencil_texture: wgpu::Texture,
    pub(crate) depth_stencil_view: wgpu::TextureView,
}

impl DrawingSurface {
    /// Creates a headless surface of `physical_size` pixels.
    ///
    /// A hardware adapter is preferred; if none is available the software
    /// fallback adapter is tried before giving up with [`Error::NoAdapter`].
    pub async fn new(physical_size: (u32, u32)) -> Result<Self> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let adapter = Self::request_adapter(&instance).await?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using adapter {} ({:?}) for headless rendering",
            adapter_info.name,
            adapter_info.backend
        );

        let limit = adapter.limits().max_texture_dimension_2d;
        let (width, height) = physical_size;
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(Error::InvalidSize {
                width,
                height,
                limit,
            });
        }

        let required_limits = wgpu::Limits::downlevel_defaults()
            .using_resolution(adapter.limits());
        check_readback_fits(physical_size, required_limits.max_buffer_size)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("clearshot_device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let color_texture = create_color_texture(&device, physical_size);
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_stencil_texture = create_depth_stencil_texture(&device, physical_size);
        let depth_stencil_view =
            depth_stencil_texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("Created {}x{} drawing surface", width, height);

        Ok(Self {
            _instance: instance,
            device,
            queue,
            adapter_info,
            physical_size,
            color_texture,
            color_view,
            depth_stencil_texture,
            depth_stencil_view,
        })
    }

    async fn request_adapter(instance: &wgpu::Instance) -> Result<wgpu::Adapter> {
        let hardware = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await;

        match hardware {
            Ok(adapter) => Ok(adapter),
            Err(error) => {
                log::info!(
                    "No hardware adapter ({}), trying the fallback adapter",
                    error
                );
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: None,
                        force_fallback_adapter: true,
                    })
                    .await?;
                Ok(adapter)
            }
        }
    }

    /// Width and height in pixels, fixed for the lifetime of the surface.
    pub fn size(&self) -> (u32, u32) {
        self.physical_size
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }
}

impl Drop for DrawingSurface {
    fn drop(&mut self) {
        self.color_texture.destroy();
        self.depth_stencil_texture.destroy();
        log::debug!(
            "Destroyed {}x{} drawing surface",
            self.physical_size.0,
            self.physical_size.1
        );
    }
}

/// Rejects surfaces whose padded readback buffer would exceed `max_buffer_size`.
fn check_readback_fits(size: (u32, u32), max_buffer_size: u64) -> Result<()> {
    let bytes = readback_buffer_size(size.0, size.1);
    if bytes > max_buffer_size {
        return Err(Error::ReadbackTooLarge {
            width: size.0,
            height: size.1,
            bytes,
            limit: max_buffer_size,
        });
    }
    Ok(())
}

fn texture_extent(size: (u32, u32)) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.0,
        height: size.1,
        depth_or_array_layers: 1,
    }
}

fn create_color_texture(device: &wgpu::Device, size: (u32, u32)) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface_color_texture"),
        size: texture_extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn create_depth_stencil_texture(device: &wgpu::Device, size: (u32, u32)) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface_depth_stencil_texture"),
        size: texture_extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_STENCIL_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

#[cfg(test)]
mod tests {
    use super::check_readback_fits;
    use crate::Error;

    const DOWNLEVEL_MAX_BUFFER_SIZE: u64 = 256 << 20;

    #[test]
    fn readback_within_buffer_limit_is_accepted() {
        check_readback_fits((64, 64), DOWNLEVEL_MAX_BUFFER_SIZE).unwrap();
        check_readback_fits((8192, 8192), DOWNLEVEL_MAX_BUFFER_SIZE).unwrap();
    }

    #[test]
    fn readback_over_buffer_limit_is_rejected() {
        let error = check_readback_fits((10000, 10000), DOWNLEVEL_MAX_BUFFER_SIZE).unwrap_err();
        assert!(matches!(
            error,
            Error::ReadbackTooLarge {
                width: 10000,
                height: 10000,
                bytes: 401_920_000,
                limit: DOWNLEVEL_MAX_BUFFER_SIZE,
            }
        ));
    }
}
