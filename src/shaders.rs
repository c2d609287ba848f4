//! WGSL sources.
//!
//! Each shader is the shared uniform block from `common.wgsl` followed by its
//! own stage functions, so the layout of [`SceneUniforms`](crate::uniforms::SceneUniforms)
//! is declared once.

const COMMON: &str = include_str!("shaders/common.wgsl");

/// The viewer's shader programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Full-screen sky gradient.
    Sky,
    /// Lit ground and props.
    Mesh,
    /// Instanced rain streaks.
    Rain,
    /// Full-screen lightning overlay.
    Flash,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 4] = [
        ShaderKind::Sky,
        ShaderKind::Mesh,
        ShaderKind::Rain,
        ShaderKind::Flash,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Sky => "Sky Shader",
            ShaderKind::Mesh => "Mesh Shader",
            ShaderKind::Rain => "Rain Shader",
            ShaderKind::Flash => "Flash Shader",
        }
    }

    /// Vertex and fragment entry points.
    pub fn entry_points(self) -> (&'static str, &'static str) {
        match self {
            ShaderKind::Sky => ("vs_sky", "fs_sky"),
            ShaderKind::Mesh => ("vs_mesh", "fs_mesh"),
            ShaderKind::Rain => ("vs_rain", "fs_rain"),
            ShaderKind::Flash => ("vs_flash", "fs_flash"),
        }
    }

    fn body(self) -> &'static str {
        match self {
            ShaderKind::Sky => include_str!("shaders/sky.wgsl"),
            ShaderKind::Mesh => include_str!("shaders/mesh.wgsl"),
            ShaderKind::Rain => include_str!("shaders/rain.wgsl"),
            ShaderKind::Flash => include_str!("shaders/flash.wgsl"),
        }
    }

    /// Complete WGSL module.
    pub fn source(self) -> String {
        format!("{}\n{}", COMMON, self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_declare_entry_points() {
        for kind in ShaderKind::ALL {
            let source = kind.source();
            let (vs, fs) = kind.entry_points();
            assert!(source.contains(&format!("fn {}(", vs)), "{:?} missing {}", kind, vs);
            assert!(source.contains(&format!("fn {}(", fs)), "{:?} missing {}", kind, fs);
            assert!(source.contains("var<uniform> scene: SceneUniforms"));
        }
    }
}
