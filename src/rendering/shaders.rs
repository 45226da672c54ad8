use std::{collections::HashMap, sync::Arc};

/// Named WGSL module cache for the embedded blit shaders.
pub struct ShaderManager {
    device: Arc<wgpu::Device>,
    shader_modules: HashMap<String, wgpu::ShaderModule>,
}

impl ShaderManager {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self {
            device,
            shader_modules: HashMap::new(),
        }
    }

    pub fn load_wgsl_str(&mut self, name: &str, source: &str) {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.shader_modules.insert(name.to_string(), module);
    }

    pub fn get(&self, name: &str) -> Option<&wgpu::ShaderModule> {
        self.shader_modules.get(name)
    }
}
