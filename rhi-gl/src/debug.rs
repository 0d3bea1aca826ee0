//! Native debug output.
use crate::api as gl;
use crate::api::types::*;
use crate::native::GlApi;
use std::ptr;
use std::slice;

pub fn debug_source_to_str(source: GLenum) -> &'static str {
    match source {
        gl::DEBUG_SOURCE_API => "OpenGL",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "Windows",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "Shader compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "Third party",
        gl::DEBUG_SOURCE_APPLICATION => "Application",
        gl::DEBUG_SOURCE_OTHER => "Other",
        _ => "?",
    }
}

pub fn debug_type_to_str(ty: GLenum) -> &'static str {
    match ty {
        gl::DEBUG_TYPE_ERROR => "Error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated behavior",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined behavior",
        gl::DEBUG_TYPE_PORTABILITY => "Portability",
        gl::DEBUG_TYPE_PERFORMANCE => "Performance",
        gl::DEBUG_TYPE_OTHER => "Other",
        gl::DEBUG_TYPE_MARKER => "Marker",
        gl::DEBUG_TYPE_PUSH_GROUP => "Push group",
        gl::DEBUG_TYPE_POP_GROUP => "Pop group",
        _ => "?",
    }
}

pub fn debug_severity_to_str(severity: GLenum) -> &'static str {
    match severity {
        gl::DEBUG_SEVERITY_HIGH => "High",
        gl::DEBUG_SEVERITY_MEDIUM => "Medium",
        gl::DEBUG_SEVERITY_LOW => "Low",
        gl::DEBUG_SEVERITY_NOTIFICATION => "Notification",
        _ => "?",
    }
}

pub fn debug_severity_to_level(severity: GLenum) -> log::Level {
    match severity {
        gl::DEBUG_SEVERITY_HIGH => log::Level::Error,
        gl::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
        gl::DEBUG_SEVERITY_LOW => log::Level::Info,
        _ => log::Level::Debug,
    }
}

pub(crate) extern "system" fn debug_callback(
    source: GLenum,
    ty: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    msg: *const GLchar,
    _data: *mut GLvoid,
) {
    if msg.is_null() {
        return;
    }
    let bytes = unsafe { slice::from_raw_parts(msg as *const u8, length.max(0) as usize) };
    let message = String::from_utf8_lossy(bytes);
    log!(
        debug_severity_to_level(severity),
        "(GL) [{}] [{}] [{}] {}: {}",
        debug_source_to_str(source),
        debug_type_to_str(ty),
        debug_severity_to_str(severity),
        id,
        message
    );
}

/// Routes native debug messages to the `log` facade.
///
/// Messages are delivered synchronously so that they show up next to the call that caused them.
pub fn install(gl: &dyn GlApi) {
    gl.enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
    gl.debug_message_callback(Some(debug_callback), ptr::null());
    gl.debug_message_control(gl::DONT_CARE, gl::DONT_CARE, gl::DONT_CARE, true);
    // notifications are mostly buffer placement chatter
    gl.debug_message_control(
        gl::DONT_CARE,
        gl::DONT_CARE,
        gl::DEBUG_SEVERITY_NOTIFICATION,
        false,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RecordingGl;

    #[test]
    fn severities() {
        assert_eq!(
            debug_severity_to_level(gl::DEBUG_SEVERITY_HIGH),
            log::Level::Error
        );
        assert_eq!(
            debug_severity_to_level(gl::DEBUG_SEVERITY_MEDIUM),
            log::Level::Warn
        );
        assert_eq!(
            debug_severity_to_level(gl::DEBUG_SEVERITY_NOTIFICATION),
            log::Level::Debug
        );
        assert_eq!(debug_severity_to_str(gl::DEBUG_SEVERITY_LOW), "Low");
    }

    #[test]
    fn names() {
        assert_eq!(debug_source_to_str(gl::DEBUG_SOURCE_SHADER_COMPILER), "Shader compiler");
        assert_eq!(debug_type_to_str(gl::DEBUG_TYPE_PERFORMANCE), "Performance");
        assert_eq!(debug_type_to_str(0), "?");
    }

    #[test]
    fn callback_handles_unterminated_messages() {
        let msg = b"buffer 3 uses video memory";
        debug_callback(
            gl::DEBUG_SOURCE_API,
            gl::DEBUG_TYPE_OTHER,
            7,
            gl::DEBUG_SEVERITY_LOW,
            msg.len() as GLsizei,
            msg.as_ptr() as *const GLchar,
            ptr::null_mut(),
        );
    }

    #[test]
    fn install_registers_the_callback() {
        let gl = RecordingGl::new();
        install(&gl);
        assert!(gl.contains("DebugMessageCallback(true)"));
        assert_eq!(gl.count("DebugMessageControl"), 2);
    }
}
