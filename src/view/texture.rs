use tracing::info;

use crate::error::AssetError;

/// Decoded RGBA8 image ready for upload
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn decode(bytes: &[u8], path: &str) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)
            .map_err(|source| AssetError::Decode { path: path.to_string(), source })?
            .into_rgba8();
        let (width, height) = image.dimensions();
        info!(path, width, height, "texture decoded");
        Ok(Self { width, height, rgba: image.into_raw() })
    }

    /// Load from the local file system
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &str) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io { path: path.to_string(), source })?;
        Self::decode(&bytes, path)
    }

    /// Fetch relative to the page
    #[cfg(target_arch = "wasm32")]
    pub async fn fetch(path: &str) -> Result<Self, AssetError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let fetch_error = |reason: String| AssetError::Fetch { path: path.to_string(), reason };

        let window = web_sys::window().ok_or_else(|| fetch_error("no global `window`".into()))?;
        let response = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|e| fetch_error(format!("{e:?}")))?
            .dyn_into::<web_sys::Response>()
            .map_err(|_| fetch_error("fetch did not return a Response".into()))?;
        if !response.ok() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }
        let buffer = response.array_buffer().map_err(|e| fetch_error(format!("{e:?}")))?;
        let buffer = JsFuture::from(buffer).await.map_err(|e| fetch_error(format!("{e:?}")))?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        Self::decode(&bytes, path)
    }
}

/// GPU texture plus the bind group the cube shader samples it through
pub struct CubeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

impl CubeTexture {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        image: &TextureImage,
    ) -> Self {
        let size = wgpu::Extent3d { width: image.width, height: image.height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cube_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cube_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        Self { texture, view, sampler, bind_group }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn decodes_png_to_rgba() {
        let tex = TextureImage::decode(&tiny_png(), "tiny.png").unwrap();
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.rgba.len(), 16);
        assert_eq!(&tex.rgba[12..16], &[255, 0, 0, 255]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = TextureImage::decode(b"not an image", "bad.png").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        assert!(err.to_string().contains("bad.png"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_file_is_an_io_error() {
        let err = TextureImage::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
