use futures::channel::oneshot;

use super::*;

/// Returns `(unpadded, padded)` bytes per row for a texture-to-buffer copy.
pub(crate) fn compute_padded_bytes_per_row(width: u32, bytes_per_pixel: u32) -> (u32, u32) {
    let unpadded_bytes_per_row = width * bytes_per_pixel;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded_bytes_per_row, padded_bytes_per_row)
}

/// Size in bytes of the row-padded buffer a `width`×`height` RGBA8 readback needs.
pub(crate) fn readback_buffer_size(width: u32, height: u32) -> u64 {
    let (_, padded_bytes_per_row) = compute_padded_bytes_per_row(width, 4);
    u64::from(padded_bytes_per_row) * u64::from(height)
}

fn copy_padded_readback_rows(
    data: &[u8],
    height: u32,
    unpadded_bytes_per_row: u32,
    padded_bytes_per_row: u32,
    output: &mut Vec<u8>,
) {
    let height = height as usize;
    let unpadded_bytes_per_row = unpadded_bytes_per_row as usize;
    let padded_bytes_per_row = padded_bytes_per_row as usize;
    let output_size = unpadded_bytes_per_row * height;
    output.resize(output_size, 0);

    if padded_bytes_per_row == unpadded_bytes_per_row {
        output.copy_from_slice(&data[..output_size]);
        return;
    }

    for row in 0..height {
        let padded_offset = row * padded_bytes_per_row;
        let unpadded_offset = row * unpadded_bytes_per_row;
        let row_data = &data[padded_offset..padded_offset + unpadded_bytes_per_row];
        output[unpadded_offset..unpadded_offset + unpadded_bytes_per_row].copy_from_slice(row_data);
    }
}

impl DrawingSurface {
    /// Reads the current color buffer back as tightly packed RGBA8 rows,
    /// top row first.
    ///
    /// Completes once the GPU copy has finished and the buffer has been mapped.
    pub async fn read_pixels(&self) -> Result<Vec<u8>> {
        let (width, height) = self.physical_size;
        let (unpadded_bytes_per_row, padded_bytes_per_row) = compute_padded_bytes_per_row(width, 4);

        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("surface_readback_buffer"),
            size: readback_buffer_size(width, height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_copy_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture_extent(self.physical_size),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = readback_buffer.slice(..);
        let (sender, receiver) = oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            if sender.send(result).is_err() {
                log::warn!("Readback receiver dropped before the buffer was mapped");
            }
        });

        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|error| Error::Readback(error.to_string()))?;

        receiver
            .await
            .map_err(|_| Error::Readback("map callback was dropped".to_string()))?
            .map_err(|error| Error::Readback(error.to_string()))?;

        let mut pixels = Vec::new();
        {
            let mapped_range = buffer_slice.get_mapped_range();
            copy_padded_readback_rows(
                &mapped_range,
                height,
                unpadded_bytes_per_row,
                padded_bytes_per_row,
                &mut pixels,
            );
        }
        readback_buffer.unmap();

        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_padded_bytes_per_row, copy_padded_readback_rows, readback_buffer_size};

    #[test]
    fn copy_padded_readback_rows_handles_unpadded_data() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let mut output = Vec::new();

        copy_padded_readback_rows(&data, 2, 4, 4, &mut output);
        assert_eq!(output, data);
    }

    #[test]
    fn copy_padded_readback_rows_strips_padding() {
        let data = vec![1, 2, 3, 4, 9, 9, 9, 9, 5, 6, 7, 8, 8, 8, 8, 8];
        let mut output = Vec::new();

        copy_padded_readback_rows(&data, 2, 4, 8, &mut output);
        assert_eq!(output, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn padded_bytes_per_row_is_aligned() {
        assert_eq!(compute_padded_bytes_per_row(64, 4), (256, 256));
        assert_eq!(compute_padded_bytes_per_row(65, 4), (260, 512));
        assert_eq!(compute_padded_bytes_per_row(1, 4), (4, 256));
    }

    #[test]
    fn readback_buffer_size_does_not_wrap_at_large_dimensions() {
        assert_eq!(compute_padded_bytes_per_row(32768, 4), (131072, 131072));
        assert_eq!(readback_buffer_size(32768, 32768), 1 << 32);
        assert_eq!(readback_buffer_size(32767, 32768), 131072 * 32768);
    }
}
