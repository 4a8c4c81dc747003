use crate::color::Color;
use crate::surface::DrawingSurface;

/// How a [`Color`] is mapped onto the clear color of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMapping {
    /// Red, green, blue and alpha in order.
    #[default]
    Rgba,
    /// Clears with `(r, b, b, 1.0)`: the blue component lands in both the
    /// green and blue channels and alpha is forced opaque.
    ///
    /// Only useful to reproduce reference images that were generated by a
    /// renderer with this channel mix-up.
    LegacyBlueAsGreen,
}

impl ChannelMapping {
    pub fn apply(self, color: Color) -> Color {
        let [r, g, b, a] = color.0;
        match self {
            ChannelMapping::Rgba => Color([r, g, b, a]),
            ChannelMapping::LegacyBlueAsGreen => Color([r, b, b, 1.0]),
        }
    }
}

/// Fills the whole surface with `color`.
///
/// Overwrites every pixel of the color buffer and resets depth to `1.0` and
/// stencil to `0`.
pub fn fill(surface: &mut DrawingSurface, color: Color) {
    fill_with(surface, color, ChannelMapping::Rgba);
}

pub fn fill_with(surface: &mut DrawingSurface, color: Color, mapping: ChannelMapping) {
    let [r, g, b, a] = mapping.apply(color).0;
    let clear_color = wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    };

    let mut encoder = surface
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("fill_encoder"),
        });
    {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fill_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &surface.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &surface.depth_stencil_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }
    surface.queue.submit(std::iter::once(encoder.finish()));
}
