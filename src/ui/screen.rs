use std::io::Write;

use chrono::{DateTime, Utc};

use usagedash_core::state::DashboardState;

use super::layout::{inner_width, render_frame};

/// Where the interior width comes from on each repaint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthProbe {
    /// Query the live terminal size
    Terminal,
    /// Always use this width
    Fixed(usize),
}

impl WidthProbe {
    pub fn width(self) -> usize {
        match self {
            WidthProbe::Terminal => inner_width(),
            WidthProbe::Fixed(width) => width,
        }
    }
}

/// Output side of the dashboard: every repaint redraws the whole frame
pub struct Screen<W: Write> {
    out: W,
    probe: WidthProbe,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, probe: WidthProbe) -> Self {
        Self { out, probe }
    }

    /// Redraw the active view from cached state
    pub fn paint(&mut self, state: &DashboardState, now: DateTime<Utc>) -> std::io::Result<()> {
        let frame = render_frame(state, self.probe.width(), now);
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagedash_core::state::ViewId;

    #[test]
    fn test_paint_writes_full_frame() {
        let mut screen = Screen::new(Vec::new(), WidthProbe::Fixed(40));
        let state = DashboardState::new(ViewId::Claude);
        let now = Utc::now();

        screen.paint(&state, now).unwrap();
        let expected = render_frame(&state, 40, now);
        assert_eq!(String::from_utf8(screen.get_ref().clone()).unwrap(), expected);
    }

    #[test]
    fn test_fixed_probe() {
        assert_eq!(WidthProbe::Fixed(55).width(), 55);
    }
}
