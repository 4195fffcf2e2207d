//! wgpu implementation of the [`RenderBackend`] contract.
//!
//! Bridges the GL-style named-uniform interface onto uniform blocks:
//! frame-global state (projection + light array) lives in one uniform
//! buffer, per-draw state (modelview, normal matrix, material) in a
//! dynamic-offset uniform buffer with one 256-byte slot per draw command.
//!
//! Draw calls are recorded during the draw pass and replayed into a render
//! pass by [`WgpuBackend::flush`]; by then the light pass has completed and
//! its output sits in the global block, preserving the lights-before-
//! geometry ordering on the GPU timeline.
//!
//! Shader modules are supplied by the host (shader source is an external
//! concern); the module must expose `vs_main`/`fs_main` and bind group 0 =
//! globals, group 1 = per-object, with vertex locations matching the
//! attribute binding order.

use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::errors::{CanopyError, Result};
use crate::renderer::backend::RenderBackend;
use crate::renderer::uniform;
use crate::renderer::uniforms::{GlobalUniforms, GpuLight, MAX_LIGHTS, ObjectUniforms};
use crate::renderer::AttributeBindings;
use crate::resources::mesh::{PolygonMesh, Topology};

/// Slot stride of the per-object dynamic uniform buffer.
const OBJECT_SLOT: u64 = 256;
/// Draw-command capacity the object buffer starts with.
const INITIAL_OBJECT_SLOTS: u64 = 64;

/// GPU-resident mesh: one planar vertex buffer per bound attribute plus an
/// index buffer.
#[derive(Debug)]
pub struct GpuMesh {
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    topology: Topology,
}

struct DrawCommand {
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    topology: Topology,
    object: ObjectUniforms,
}

/// [`RenderBackend`] over a wgpu device.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub clear_color: wgpu::Color,

    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    vertex_formats: Vec<wgpu::VertexFormat>,

    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_capacity: u64,

    globals: GlobalUniforms,
    object: ObjectUniforms,
    commands: Vec<DrawCommand>,
}

impl WgpuBackend {
    /// Builds pipelines and uniform plumbing for the given shader module.
    ///
    /// `vertex_formats` lists the vertex attribute formats in shader
    /// location order; it must line up with the attribute bindings handed
    /// to the scene renderer. `depth_format`, when set, enables a standard
    /// less-than depth test (the caller supplies the matching depth view
    /// at [`flush`](WgpuBackend::flush) time).
    #[must_use]
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        shader: &wgpu::ShaderModule,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        vertex_formats: Vec<wgpu::VertexFormat>,
    ) -> Self {
        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>()
                        as u64),
                },
                count: None,
            }],
        });

        let globals = GlobalUniforms::default();
        let global_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global Uniforms"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global BindGroup"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let (object_buffer, object_bind_group) =
            Self::create_object_buffer(&device, &object_layout, INITIAL_OBJECT_SLOTS);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(&global_layout), Some(&object_layout)],
            immediate_size: 0,
        });

        // One planar vertex buffer per bound attribute, shader locations in
        // binding order.
        let vertex_attributes: Vec<[wgpu::VertexAttribute; 1]> = vertex_formats
            .iter()
            .enumerate()
            .map(|(location, format)| {
                [wgpu::VertexAttribute {
                    format: *format,
                    offset: 0,
                    shader_location: location as u32,
                }]
            })
            .collect();
        let buffer_layouts: Vec<wgpu::VertexBufferLayout> = vertex_attributes
            .iter()
            .zip(&vertex_formats)
            .map(|(attributes, format)| wgpu::VertexBufferLayout {
                array_stride: format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        let make_pipeline = |topology: wgpu::PrimitiveTopology, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &buffer_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..Default::default()
                },
                depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: Some(true),
                    depth_compare: Some(wgpu::CompareFunction::Less),
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let triangle_pipeline = make_pipeline(wgpu::PrimitiveTopology::TriangleList, "Scene Pipeline");
        let line_pipeline = make_pipeline(wgpu::PrimitiveTopology::LineList, "Wireframe Pipeline");

        Self {
            device,
            queue,
            clear_color: wgpu::Color::BLACK,
            triangle_pipeline,
            line_pipeline,
            vertex_formats,
            global_buffer,
            global_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_capacity: INITIAL_OBJECT_SLOTS,
            globals,
            object: ObjectUniforms::default(),
            commands: Vec::new(),
        }
    }

    fn create_object_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        slots: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniforms"),
            size: slots * OBJECT_SLOT,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Encodes every draw command recorded since the last flush.
    ///
    /// Writes the global and per-object uniform buffers, then replays the
    /// commands into one render pass against `color_view` (and
    /// `depth_view` when the backend was built with a depth format).
    pub fn flush(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: Option<&wgpu::TextureView>,
    ) {
        self.queue
            .write_buffer(&self.global_buffer, 0, bytemuck::bytes_of(&self.globals));

        let needed = self.commands.len() as u64;
        if needed > self.object_capacity {
            self.object_capacity = needed.next_power_of_two();
            let (buffer, bind_group) = Self::create_object_buffer(
                &self.device,
                &self.object_layout,
                self.object_capacity,
            );
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
        }

        let mut staging = vec![0u8; (self.commands.len().max(1)) * OBJECT_SLOT as usize];
        for (i, cmd) in self.commands.iter().enumerate() {
            let offset = i * OBJECT_SLOT as usize;
            let bytes = bytemuck::bytes_of(&cmd.object);
            staging[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.object_buffer, 0, &staging);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth_view.map(|view| {
                wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }
            }),
            ..Default::default()
        });

        pass.set_bind_group(0, &self.global_bind_group, &[]);
        for (i, cmd) in self.commands.iter().enumerate() {
            let pipeline = match cmd.topology {
                Topology::Triangles => &self.triangle_pipeline,
                Topology::Lines => &self.line_pipeline,
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &self.object_bind_group, &[(i as u64 * OBJECT_SLOT) as u32]);
            for (slot, buffer) in cmd.vertex_buffers.iter().enumerate() {
                pass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
            pass.set_index_buffer(cmd.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..cmd.index_count, 0, 0..1);
        }
        drop(pass);

        self.commands.clear();
    }
}

impl RenderBackend for WgpuBackend {
    type MeshHandle = GpuMesh;

    fn upload_mesh(
        &mut self,
        name: &str,
        mesh: &PolygonMesh,
        bindings: &AttributeBindings,
    ) -> Result<GpuMesh> {
        if bindings.len() != self.vertex_formats.len() {
            return Err(CanopyError::Backend(format!(
                "{} attribute bindings but {} vertex formats configured",
                bindings.len(),
                self.vertex_formats.len()
            )));
        }

        let vertex_count = mesh.vertex_count();
        let mut vertex_buffers = Vec::with_capacity(bindings.len());
        for ((_, attr_name), format) in bindings.iter().zip(&self.vertex_formats) {
            // Presence was validated at registration; component widths are
            // checked here against the pipeline's vertex layout.
            let attribute = mesh.attribute(attr_name).ok_or_else(|| {
                CanopyError::MissingAttribute {
                    mesh: name.to_string(),
                    attribute: attr_name.to_string(),
                }
            })?;
            let expected = (format.size() / 4) as usize;
            if attribute.components() != expected {
                return Err(CanopyError::MalformedAttribute {
                    mesh: name.to_string(),
                    attribute: attr_name.to_string(),
                    reason: format!(
                        "{} components where the pipeline expects {expected}",
                        attribute.components()
                    ),
                });
            }
            let data = &attribute.data()[..vertex_count * attribute.components()];
            vertex_buffers.push(self.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{name}:{attr_name}")),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::VERTEX,
                },
            ));
        }

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name}:indices")),
                contents: bytemuck::cast_slice(mesh.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(GpuMesh {
            vertex_buffers,
            index_buffer,
            index_count: mesh.indices().len() as u32,
            topology: mesh.topology(),
        })
    }

    fn release_mesh(&mut self, handle: GpuMesh) {
        for buffer in &handle.vertex_buffers {
            buffer.destroy();
        }
        handle.index_buffer.destroy();
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        match name {
            uniform::MODELVIEW => self.object.modelview = value,
            uniform::NORMAL_MATRIX => self.object.normal_matrix = value,
            uniform::PROJECTION => self.globals.projection = value,
            _ => log::trace!("unknown mat4 uniform '{name}'"),
        }
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        match parse_light_field(name) {
            Some((i, "position")) => self.light_mut(i).position = value,
            Some((i, "spotDirection")) => self.light_mut(i).spot_direction = value,
            _ => log::trace!("unknown vec4 uniform '{name}'"),
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        match name {
            uniform::MATERIAL_AMBIENT => self.object.ambient = value,
            uniform::MATERIAL_DIFFUSE => self.object.diffuse = value,
            uniform::MATERIAL_SPECULAR => self.object.specular = value,
            _ => match parse_light_field(name) {
                Some((i, "ambient")) => self.light_mut(i).ambient = value,
                Some((i, "diffuse")) => self.light_mut(i).diffuse = value,
                Some((i, "specular")) => self.light_mut(i).specular = value,
                _ => log::trace!("unknown vec3 uniform '{name}'"),
            },
        }
    }

    fn set_f32(&mut self, name: &str, value: f32) {
        match name {
            uniform::MATERIAL_SHININESS => self.object.shininess = value,
            _ => match parse_light_field(name) {
                Some((i, "cos_Cutoff")) => self.light_mut(i).cos_cutoff = value,
                _ => log::trace!("unknown f32 uniform '{name}'"),
            },
        }
    }

    fn set_i32(&mut self, name: &str, value: i32) {
        match name {
            uniform::LIGHT_COUNT => {
                if value > MAX_LIGHTS as i32 {
                    log::warn!("{value} lights collected, shader array holds {MAX_LIGHTS}");
                }
                self.globals.light_count = value.clamp(0, MAX_LIGHTS as i32) as u32;
            }
            _ => match parse_light_field(name) {
                Some((i, "isSpot")) => self.light_mut(i).is_spot = u32::from(value != 0),
                _ => log::trace!("unknown i32 uniform '{name}'"),
            },
        }
    }

    fn draw_mesh(&mut self, handle: &GpuMesh) -> Result<()> {
        self.commands.push(DrawCommand {
            vertex_buffers: handle.vertex_buffers.clone(),
            index_buffer: handle.index_buffer.clone(),
            index_count: handle.index_count,
            topology: handle.topology,
            object: self.object,
        });
        Ok(())
    }
}

impl WgpuBackend {
    fn light_mut(&mut self, index: usize) -> &mut GpuLight {
        // Out-of-range writes land in a scratch slot rather than panicking;
        // upload_lights already warned about the overflow.
        if index < MAX_LIGHTS {
            &mut self.globals.lights[index]
        } else {
            &mut self.globals.lights[MAX_LIGHTS - 1]
        }
    }
}

/// Splits `light[3].ambient` into `(3, "ambient")`.
fn parse_light_field(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("light[")?;
    let (index, field) = rest.split_once("].")?;
    Some((index.parse().ok()?, field))
}
