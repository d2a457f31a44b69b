//! UI rendering and layout utilities

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Application state for UI rendering
#[derive(Clone)]
pub struct UiState {
    pub bpm: f64,
    pub last_bpm: f64,
    pub locked: bool,
    pub metronome_running: bool,
    pub metronome_bpm: f64,
    pub tap_count: usize,
    /// Progress toward the next tick, when the metronome is running
    pub beat_phase: Option<f64>,
    /// Beat flash is currently lit
    pub flash: bool,
    pub min_bpm: f64,
    pub max_bpm: f64,
    pub status: String,
}

/// Create a sweep bar showing progress toward the next metronome tick
pub fn create_beat_bar(width: usize, phase: f64, flash: bool) -> Line<'static> {
    let filled = (phase * width as f64) as usize;
    let partial_fill = (phase * width as f64) - filled as f64;
    let mut spans = Vec::new();

    // The sweep brightens as the beat approaches, and the whole bar lights
    // up during the flash window right after a tick.
    for i in 0..width {
        let color = if flash {
            Color::White
        } else if i < width / 2 {
            Color::DarkGray
        } else if i < 5 * width / 6 {
            Color::Cyan
        } else {
            Color::LightCyan
        };

        let ch = if i < filled {
            '█' // Fully swept
        } else if i == filled && partial_fill > 0.0 {
            // Partial fill characters for a smoother sweep
            match (partial_fill * 8.0) as usize {
                0 | 1 => '░',
                2 | 3 => '▒',
                4 | 5 => '▓',
                _ => '█',
            }
        } else {
            '░' // Not reached yet
        };
        spans.push(Span::styled(ch.to_string(), Style::default().fg(color)));
    }

    Line::from(spans)
}

/// Create a BPM scale line with a marker at the current tempo
pub fn create_bpm_scale(width: usize, bpm: f64, min_bpm: f64, max_bpm: f64) -> Line<'static> {
    let mut spans = Vec::new();

    let range = (max_bpm - min_bpm).max(f64::EPSILON);
    let bpm_ratio = ((bpm - min_bpm) / range).clamp(0.0, 1.0);
    let marker_pos = (bpm_ratio * (width.saturating_sub(1)) as f64).round() as usize;

    for i in 0..width {
        if i == marker_pos {
            spans.push(Span::styled(
                "▲".to_string(),
                Style::default().fg(Color::White),
            ));
            continue;
        }

        let label = if i == 0 {
            format!("{:.0}", min_bpm)
        } else if i == width - 1 {
            format!("{:.0}", max_bpm)
        } else if i == width / 2 {
            format!("{:.0}", min_bpm + range / 2.0)
        } else {
            " ".to_string()
        };

        spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

/// Render the complete UI
pub fn render_ui(f: &mut Frame, state: &UiState) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(size);

    // Current and previous tempo
    let bpm_style = if state.flash {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    let tempo_lines = vec![
        Line::from(Span::styled(format!("{:>7.1} BPM", state.bpm), bpm_style)),
        Line::from(Span::styled(
            format!("{:>7.1} prev", state.last_bpm),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let tempo_block = Block::default().title("Tempo").borders(Borders::ALL);
    f.render_widget(Paragraph::new(tempo_lines).block(tempo_block), chunks[0]);

    // Session and metronome indicators
    let lock_span = if state.locked {
        Span::styled("[locked]", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("[unlocked]", Style::default().fg(Color::DarkGray))
    };
    let metronome_span = if state.metronome_running {
        Span::styled(
            format!("[metronome {:.1} BPM]", state.metronome_bpm),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("[metronome off]", Style::default().fg(Color::DarkGray))
    };
    let session_line = Line::from(vec![
        lock_span,
        Span::raw("  "),
        metronome_span,
        Span::raw("  "),
        Span::raw(format!("taps: {}", state.tap_count)),
    ]);
    let session_block = Block::default().title("Session").borders(Borders::ALL);
    f.render_widget(Paragraph::new(session_line).block(session_block), chunks[1]);

    // Status
    let status_block = Block::default().title("Status").borders(Borders::ALL);
    f.render_widget(
        Paragraph::new(state.status.as_str()).block(status_block),
        chunks[2],
    );

    // Beat sweep with tempo scale
    let bar_width =
        (chunks[3].width as usize).saturating_sub(crate::constants::ui::BAR_BORDER_WIDTH);
    let phase = state.beat_phase.unwrap_or(0.0);
    let bar_line = create_beat_bar(bar_width, phase, state.flash);
    let scale_line = create_bpm_scale(bar_width, state.bpm, state.min_bpm, state.max_bpm);
    let title = if state.metronome_running {
        format!("Beat ({:.0} ms period)", 60_000.0 / state.metronome_bpm)
    } else {
        "Beat".to_string()
    };
    let gauge = Paragraph::new(vec![bar_line, scale_line])
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(gauge, chunks[3]);
}
