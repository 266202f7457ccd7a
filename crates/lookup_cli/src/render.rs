//! Terminal rendering of a [`LookupView`]

use lookup_core::{LookupConfig, LookupView};

// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GRAY: &str = "\x1b[90m";
    pub const BOLD: &str = "\x1b[1m";
    pub const CYAN: &str = "\x1b[36m";
}

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Formats views as plain terminal text
pub struct Renderer {
    label: String,
    no_options_text: String,
    color: bool,
    frame: usize,
}

impl Renderer {
    pub fn new(config: &LookupConfig) -> Self {
        Self {
            label: config.label.clone(),
            no_options_text: config.no_options_text.clone(),
            color: true,
            frame: 0,
        }
    }

    /// Disable ANSI escapes
    pub fn plain(mut self) -> Self {
        self.color = false;
        self
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, colors::RESET)
        } else {
            text.to_string()
        }
    }

    /// Format one frame
    pub fn render(&mut self, view: &LookupView) -> String {
        let mut out = format!("{}: {}", self.paint(colors::BOLD, &self.label), view.input);

        if view.loading {
            let spinner = SPINNER[self.frame % SPINNER.len()];
            self.frame += 1;
            out.push_str(&format!(" {}", self.paint(colors::CYAN, spinner)));
        }
        out.push('\n');

        if view.open {
            for option in &view.options {
                if view.is_selected(option) {
                    let line = format!("  * {} <{}> (selected)", option.label(), option.email);
                    out.push_str(&self.paint(colors::GREEN, &line));
                } else {
                    out.push_str(&format!("    {} <{}>", option.label(), option.email));
                }
                out.push_str(&format!(" {}\n", self.paint(colors::GRAY, &format!("#{}", option.id))));
            }
            if view.no_options {
                out.push_str(&format!("    {}\n", self.paint(colors::GRAY, &self.no_options_text)));
            }
        } else if let Some(selected) = &view.selection {
            out.push_str(&format!("  selected: {} (#{})\n", selected.label(), selected.id));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookup_core::{Candidate, SelectionState};

    fn view_with(f: impl FnOnce(&mut SelectionState)) -> LookupView {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.apply_success(
            1,
            vec![
                Candidate::new(1, "Leanne Graham", "Sincere@april.biz"),
                Candidate::new(2, "Ervin Howell", "Shanna@melissa.tv"),
            ],
        );
        f(&mut state);
        state.view()
    }

    fn renderer() -> Renderer {
        Renderer::new(&LookupConfig::default()).plain()
    }

    #[test]
    fn test_closed_shows_input_only() {
        let view = view_with(|s| s.set_input("er"));
        assert_eq!(renderer().render(&view), "Selection here.....: er\n");
    }

    #[test]
    fn test_open_marks_selected() {
        let view = view_with(|s| {
            s.open();
            let ervin = s.find(2).cloned();
            s.select(ervin);
        });
        let out = renderer().render(&view);
        assert!(out.contains("    Leanne Graham <Sincere@april.biz> #1\n"));
        assert!(out.contains("  * Ervin Howell <Shanna@melissa.tv> (selected) #2\n"));
    }

    #[test]
    fn test_no_options_text() {
        let view = view_with(|s| {
            s.set_input("zzz");
            s.open();
        });
        assert!(renderer().render(&view).ends_with("    Add new\n"));
    }

    #[test]
    fn test_spinner_advances_while_loading() {
        let view = view_with(|s| {
            s.begin_request(2);
        });
        let mut renderer = renderer();
        assert_eq!(renderer.render(&view), "Selection here.....:  |\n");
        assert_eq!(renderer.render(&view), "Selection here.....:  /\n");
    }

    #[test]
    fn test_closed_shows_selection() {
        let view = view_with(|s| {
            let leanne = s.find(1).cloned();
            s.select(leanne);
        });
        assert!(renderer()
            .render(&view)
            .ends_with("  selected: Leanne Graham (#1)\n"));
    }
}
