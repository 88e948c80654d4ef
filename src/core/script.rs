//! Scripts (the ordered lines a sequencer reveals) and the built-in
//! SirenaMap demo catalog.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unknown demo `{0}` (expected one of: navigate, locate, list, offers, showcase)")]
    UnknownDemo(String),
    #[error("failed to read script {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ───────────────────────────────────────── script ────────────

/// An immutable, cheaply clonable list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    lines: Arc<[String]>,
}

impl Script {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a script from a text file, one line per script line.
    /// Trailing `\r` is stripped so CRLF files behave.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        Self::new(contents.lines().map(|l| l.trim_end_matches('\r')))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of characters the sequencer will emit for this script.
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }
}

impl<S: Into<String>> FromIterator<S> for Script {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<DemoKind> for Script {
    fn from(kind: DemoKind) -> Self {
        Self::new(kind.lines().iter().copied())
    }
}

// ───────────────────────────────────────── catalog ───────────

/// The built-in demos.  The first four play in the terminal panel; the
/// showcase plays inside the demo modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoKind {
    Navigate,
    Locate,
    List,
    Offers,
    Showcase,
}

impl DemoKind {
    pub const ALL: &[DemoKind] = &[
        DemoKind::Navigate,
        DemoKind::Locate,
        DemoKind::List,
        DemoKind::Offers,
        DemoKind::Showcase,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DemoKind::Navigate => "navigate",
            DemoKind::Locate => "locate",
            DemoKind::List => "list",
            DemoKind::Offers => "offers",
            DemoKind::Showcase => "showcase",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ScriptError> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ScriptError::UnknownDemo(name.to_string()))
    }

    /// Short description for `--list` and the sidebar.
    pub fn summary(self) -> &'static str {
        match self {
            DemoKind::Navigate => "route to a product",
            DemoKind::Locate => "find the shopper via beacons",
            DemoKind::List => "manage the shopping list",
            DemoKind::Offers => "personalised offers",
            DemoKind::Showcase => "full interactive walkthrough",
        }
    }

    pub fn lines(self) -> &'static [&'static str] {
        match self {
            DemoKind::Navigate => &[
                "$ sirenamap navigate --product=leche",
                "🗺️ Generando ruta al producto...",
                "📍 Ubicación: Pasillo 5, Estante B",
                "➡️ Sigue recto 10 metros, gira a la izquierda",
                "✅ Ruta optimizada generada (15 segundos)",
                "🎯 Distancia total: 25 metros",
            ],
            DemoKind::Locate => &[
                "$ sirenamap locate --user=cliente123",
                "📶 Conectando con beacons Bluetooth...",
                "📍 Ubicación actual: Entrada principal",
                "🔄 Actualizando posición en tiempo real...",
                "✅ Posición detectada con precisión de 1 metro",
            ],
            DemoKind::List => &[
                "$ sirenamap list --manage",
                "📋 Cargando lista de compras...",
                "🛒 Productos: Leche, Pan, Huevos",
                "✅ Leche marcada como encontrada",
                "➡️ Siguiente producto: Pan (Pasillo 3)",
                "✨ Lista sincronizada con el mapa",
            ],
            DemoKind::Offers => &[
                "$ sirenamap offers --personalized",
                "🎁 Buscando ofertas relevantes...",
                "🏷️ Oferta: 2x1 en leche (Pasillo 5)",
                "🏷️ Descuento: 20% en pan integral",
                "✅ Ofertas enviadas a la app del usuario",
            ],
            DemoKind::Showcase => &[
                "$ sirenamap demo --interactive --full",
                "🎬 Cargando demostración completa...",
                "✨ Todos los módulos activados",
                "🎯 Modo interactivo habilitado",
                "🔧 Configuración: Supermercado simulado",
                "✅ Sistema listo para explorar",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_names_resolve_case_insensitively() {
        assert_eq!(DemoKind::from_name("Navigate").unwrap(), DemoKind::Navigate);
        assert_eq!(DemoKind::from_name(" offers ").unwrap(), DemoKind::Offers);
        assert!(matches!(
            DemoKind::from_name("checkout"),
            Err(ScriptError::UnknownDemo(name)) if name == "checkout"
        ));
    }

    #[test]
    fn every_demo_starts_with_a_prompt_line() {
        for &kind in DemoKind::ALL {
            let script = Script::from(kind);
            assert!(!script.is_empty());
            assert!(script.lines()[0].starts_with("$ sirenamap"), "{kind:?}");
        }
    }

    #[test]
    fn char_count_uses_scalar_values() {
        let script = Script::new(["ab", "📍x", ""]);
        assert_eq!(script.char_count(), 4);
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn parse_strips_carriage_returns() {
        let script = Script::parse("$ one\r\ntwo\r\n\r\nfour");
        assert_eq!(script.lines(), &["$ one", "two", "", "four"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Script::load(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
