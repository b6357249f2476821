use super::{VisualizationFeed, WaveformPreview, PREVIEW_SIZE};
use crate::input::{Key, KeySnapshot};
use glfw::{Action, Context, GlfwReceiver, WindowEvent};
use std::ffi::CString;

const MARGIN: f32 = 40.0;
const BUFFER_PANEL: (f32, f32) = (580.0, 240.0);

const TRACE_COLOR: (f32, f32, f32) = (0.2, 1.0, 0.5);
const PANEL_BACKGROUND: (f32, f32, f32) = (0.0, 0.0, 0.0);

/// One rectangle of the window with a line strip drawn inside it.
/// Coordinates are pixels with the origin at the top-left.
struct Panel<'a> {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    points: &'a [[f32; 2]],
}

/// Synth window: float buffer, raw PCM bytes and the waveform preview
pub struct WaveformDisplay {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: GlfwReceiver<(f64, WindowEvent)>,
    width: u32,
    height: u32,
    shader_program: u32,
    vao: u32,
    vbo: u32,
    vertices: Vec<f32>,
}

impl WaveformDisplay {
    /// Create a new display window
    pub fn new(width: u32, height: u32, title: &str) -> Result<Self, String> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| format!("Failed to initialize GLFW: {:?}", e))?;

        // Request OpenGL 3.3 Core Profile
        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or_else(|| "Failed to create GLFW window".to_string())?;

        window.make_current();
        window.set_framebuffer_size_polling(true);

        gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);

        let shader_program = unsafe { create_shader_program()? };
        let (vao, vbo) = unsafe { create_buffers() };

        Ok(Self {
            glfw,
            window,
            events,
            width,
            height,
            shader_program,
            vao,
            vbo,
            vertices: Vec::new(),
        })
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Pump window events and sample the keyboard
    pub fn poll_keys(&mut self) -> KeySnapshot {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            if let WindowEvent::FramebufferSize(width, height) = event {
                self.width = width as u32;
                self.height = height as u32;
                unsafe {
                    gl::Viewport(0, 0, width, height);
                }
            }
        }

        Key::ALL
            .iter()
            .copied()
            .filter(|key| self.is_held(*key))
            .collect()
    }

    fn is_held(&self, key: Key) -> bool {
        let pressed = |glfw_key| self.window.get_key(glfw_key) == Action::Press;
        match key {
            Key::Escape => pressed(glfw::Key::Escape),
            Key::Up => pressed(glfw::Key::Up),
            Key::Down => pressed(glfw::Key::Down),
            Key::Left => pressed(glfw::Key::Left),
            Key::Right => pressed(glfw::Key::Right),
            Key::Space => pressed(glfw::Key::Space),
            Key::Shift => pressed(glfw::Key::LeftShift) || pressed(glfw::Key::RightShift),
            Key::P => pressed(glfw::Key::P),
            Key::R => pressed(glfw::Key::R),
        }
    }

    /// Draw the three panels and present the frame
    pub fn render(&mut self, feed: &VisualizationFeed<'_>, preview: &WaveformPreview) {
        let (buffer_width, buffer_height) = BUFFER_PANEL;
        let float_points = feed.float_view().trace(buffer_width, buffer_height);
        let pcm_points = feed.pcm_view().trace(buffer_width, buffer_height);
        let preview_points = preview.trace(PREVIEW_SIZE.0);

        let panels = [
            Panel {
                x: MARGIN,
                y: MARGIN,
                width: buffer_width,
                height: buffer_height,
                points: &float_points,
            },
            Panel {
                x: self.width as f32 - buffer_width - MARGIN,
                y: MARGIN,
                width: buffer_width,
                height: buffer_height,
                points: &pcm_points,
            },
            Panel {
                x: MARGIN,
                y: self.height as f32 - PREVIEW_SIZE.1 - MARGIN,
                width: PREVIEW_SIZE.0,
                height: PREVIEW_SIZE.1,
                points: &preview_points,
            },
        ];

        unsafe {
            gl::ClearColor(0.125, 0.125, 0.125, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
            gl::UseProgram(self.shader_program);
        }

        for panel in &panels {
            self.draw_panel(panel);
        }

        self.window.swap_buffers();
    }

    fn draw_panel(&mut self, panel: &Panel<'_>) {
        let window_width = self.width.max(1) as f32;
        let window_height = self.height.max(1) as f32;

        unsafe {
            // Panel background, GL scissor origin is bottom-left
            gl::Enable(gl::SCISSOR_TEST);
            gl::Scissor(
                panel.x as i32,
                (window_height - panel.y - panel.height) as i32,
                panel.width as i32,
                panel.height as i32,
            );
            let (r, g, b) = PANEL_BACKGROUND;
            gl::ClearColor(r, g, b, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }

        if panel.points.len() >= 2 {
            self.vertices.clear();
            for [px, py] in panel.points {
                let x = (panel.x + px) / window_width * 2.0 - 1.0;
                let y = 1.0 - (panel.y + py) / window_height * 2.0;
                self.vertices.push(x);
                self.vertices.push(y);
            }

            unsafe {
                let color_location = gl::GetUniformLocation(
                    self.shader_program,
                    b"color\0".as_ptr() as *const gl::types::GLchar,
                );
                let (r, g, b) = TRACE_COLOR;
                gl::Uniform3f(color_location, r, g, b);

                gl::BindVertexArray(self.vao);
                gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo);
                gl::BufferData(
                    gl::ARRAY_BUFFER,
                    (self.vertices.len() * std::mem::size_of::<f32>()) as isize,
                    self.vertices.as_ptr() as *const _,
                    gl::DYNAMIC_DRAW,
                );
                gl::LineWidth(2.0);
                gl::DrawArrays(gl::LINE_STRIP, 0, (self.vertices.len() / 2) as i32);
                gl::BindVertexArray(0);
            }
        }

        unsafe {
            gl::Disable(gl::SCISSOR_TEST);
        }
    }
}

impl Drop for WaveformDisplay {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.shader_program);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

const TRACE_VERTEX_SHADER: &str = r#"
    #version 330 core
    layout (location = 0) in vec2 position;

    void main() {
        gl_Position = vec4(position, 0.0, 1.0);
    }
"#;

const TRACE_FRAGMENT_SHADER: &str = r#"
    #version 330 core
    uniform vec3 color;
    out vec4 fragment;

    void main() {
        fragment = vec4(color, 1.0);
    }
"#;

unsafe fn compile_shader(kind: gl::types::GLenum, source: &str, stage: &'static str) -> Result<u32, String> {
    let source = CString::new(source).map_err(|e| e.to_string())?;
    let shader = gl::CreateShader(kind);
    gl::ShaderSource(shader, 1, &source.as_ptr(), std::ptr::null());
    gl::CompileShader(shader);
    check_status(GlObject::Shader(shader, stage))?;
    Ok(shader)
}

/// Flat-colored line program shared by every panel
unsafe fn create_shader_program() -> Result<u32, String> {
    let vertex_shader = compile_shader(gl::VERTEX_SHADER, TRACE_VERTEX_SHADER, "Vertex")?;
    let fragment_shader = compile_shader(gl::FRAGMENT_SHADER, TRACE_FRAGMENT_SHADER, "Fragment")?;

    let program = gl::CreateProgram();
    gl::AttachShader(program, vertex_shader);
    gl::AttachShader(program, fragment_shader);
    gl::LinkProgram(program);

    gl::DeleteShader(vertex_shader);
    gl::DeleteShader(fragment_shader);

    check_status(GlObject::Program(program))?;
    Ok(program)
}

unsafe fn create_buffers() -> (u32, u32) {
    let mut vao = 0;
    let mut vbo = 0;

    gl::GenVertexArrays(1, &mut vao);
    gl::GenBuffers(1, &mut vbo);

    gl::BindVertexArray(vao);
    gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

    gl::VertexAttribPointer(
        0,
        2,
        gl::FLOAT,
        gl::FALSE,
        2 * std::mem::size_of::<f32>() as i32,
        std::ptr::null(),
    );
    gl::EnableVertexAttribArray(0);

    gl::BindBuffer(gl::ARRAY_BUFFER, 0);
    gl::BindVertexArray(0);

    (vao, vbo)
}

/// Which GL object an info log is read from
#[derive(Clone, Copy)]
enum GlObject {
    Shader(u32, &'static str),
    Program(u32),
}

/// Turn a failed compile or link into an error carrying the driver's info log
unsafe fn check_status(object: GlObject) -> Result<(), String> {
    let mut ok = 0;
    let mut log_length = 0;
    match object {
        GlObject::Shader(id, _) => {
            gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut ok);
            gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut log_length);
        }
        GlObject::Program(id) => {
            gl::GetProgramiv(id, gl::LINK_STATUS, &mut ok);
            gl::GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut log_length);
        }
    }
    if ok != 0 {
        return Ok(());
    }

    let mut log = vec![0u8; log_length.max(1) as usize];
    let log_ptr = log.as_mut_ptr() as *mut gl::types::GLchar;
    match object {
        GlObject::Shader(id, stage) => {
            gl::GetShaderInfoLog(id, log_length, std::ptr::null_mut(), log_ptr);
            Err(format!("{} shader failed to compile: {}", stage, String::from_utf8_lossy(&log)))
        }
        GlObject::Program(id) => {
            gl::GetProgramInfoLog(id, log_length, std::ptr::null_mut(), log_ptr);
            Err(format!("Trace program failed to link: {}", String::from_utf8_lossy(&log)))
        }
    }
}
