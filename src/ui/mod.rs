use std::sync::OnceLock;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect, Alignment},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::browser::BrowserEntry;
use crate::composer::PostMode;
use crate::media::{declared_mime, format_bytes, MediaKind, Preview, UNKNOWN_MIME};
use crate::theme::Theme;
use crate::toast::ToastKind;

// Theme is resolved from config once at startup
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme before the first draw; later calls are ignored
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

const CAPTION_PLACEHOLDER: &str = "Write something awesome...";

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let platform_rows = boxed_height(app.composer.platforms().len());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),               // Title
            Constraint::Length(1),               // Toast line
            Constraint::Min(10),                 // Body
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_title(f, chunks[0]);
    draw_toast_line(f, app, chunks[1]);

    // Narrow terminals give the media panel less room
    let (left_pct, right_pct) = if area.width < 90 { (60, 40) } else { (55, 45) };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_pct),
            Constraint::Percentage(right_pct),
        ])
        .split(chunks[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Chips
            Constraint::Length(platform_rows),   // Platform checklist
            Constraint::Length(3),               // Mode toggle
            Constraint::Min(4),                  // Caption
            Constraint::Length(3),               // Post button
        ])
        .split(columns[0]);

    draw_chips(f, app, left[0]);
    draw_platforms(f, app, left[1]);
    draw_mode(f, app, left[2]);
    draw_caption(f, app, left[3]);
    draw_post_button(f, app, left[4]);
    draw_media(f, app, columns[1]);
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::FileBrowser => draw_file_browser(f, app),
        Popup::Help => draw_help_popup(f),
    }
}

/// Height of a bordered box holding `rows` lines
fn boxed_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

fn section_block(title: &str, is_active: bool) -> Block<'_> {
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled("📢 Social Media Post", Style::default().fg(header()).add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn draw_toast_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.toaster.current() {
        Some(toast) => {
            let color = match toast.kind {
                ToastKind::Success => success(),
                ToastKind::Warning => warning(),
                ToastKind::Error => danger(),
            };
            Line::from(Span::styled(toast.message.as_str(), Style::default().fg(color).add_modifier(Modifier::BOLD)))
        }
        None => Line::from(""),
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_chips(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Chips;
    let block = section_block(" Selected ", is_active);
    let selection = app.composer.selection();

    let line = if selection.is_empty() {
        Line::from(Span::styled(" No platforms selected", Style::default().fg(text_dim())))
    } else {
        let mut spans = Vec::new();
        for (i, id) in selection.ids().iter().enumerate() {
            let Some(platform) = app.composer.platforms().get(id) else {
                continue;
            };
            let chip_style = if is_active && i == app.chip_cursor {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default().fg(text())
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("{} ", platform.icon), chip_style.fg(platform.color)));
            spans.push(Span::styled(platform.label.as_str(), chip_style));
            spans.push(Span::styled(" ×", chip_style.fg(danger())));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_platforms(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Platforms;
    let block = section_block(" Select Platforms ", is_active);

    let rows: Vec<Row> = app.composer.platforms()
        .iter()
        .enumerate()
        .map(|(i, platform)| {
            let checked = app.composer.selection().contains(&platform.id);
            let (mark, mark_color) = if checked { ("[x]", success()) } else { ("[ ]", text_dim()) };

            let row_style = if i == app.platform_cursor && is_active {
                Style::default()
                    .bg(bg_selected())
                    .fg(text())
            } else {
                Style::default()
            };

            Row::new(vec![
                Span::styled(mark, Style::default().fg(mark_color)),
                Span::styled(platform.icon.as_str(), Style::default().fg(platform.color)),
                Span::styled(platform.label.as_str(), Style::default().fg(text())),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [Constraint::Length(4), Constraint::Length(2), Constraint::Min(10)];
    let table = Table::new(rows, widths).block(block);

    f.render_widget(table, area);
}

fn draw_mode(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Mode;
    let block = section_block(" Post Mode ", is_active);

    let mode = app.composer.mode();
    let on = Style::default().fg(accent()).add_modifier(Modifier::BOLD | Modifier::REVERSED);
    let off = Style::default().fg(text_dim());

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(" Instant ", if mode == PostMode::Instant { on } else { off }),
        Span::styled(" │ ", Style::default().fg(inactive())),
        Span::styled(" Scheduled ", if mode == PostMode::Scheduled { on } else { off }),
    ]);

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_caption(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.is_typing();
    let block = section_block(" Caption ", is_active);
    let caption = app.composer.caption();

    let mut lines: Vec<Line> = if caption.is_empty() && !is_active {
        vec![Line::from(Span::styled(CAPTION_PLACEHOLDER, Style::default().fg(text_dim())))]
    } else {
        caption
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(text()))))
            .collect()
    };

    // Cursor at the end of the text
    if is_active {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("▏", Style::default().fg(accent())));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_post_button(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Post;
    let mode = app.composer.mode();
    let color = if mode.is_scheduled() { warning() } else { success() };

    let style = if is_active {
        Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    };

    let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", mode.button_label()), style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if is_active { color } else { inactive() })),
        );

    f.render_widget(button, area);
}

fn draw_media(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Media;
    let block = section_block(" Upload Media ", is_active);

    let lines = match app.composer.preview() {
        Some(preview) => preview_lines(preview),
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No media attached", Style::default().fg(text_dim()))),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Enter", Style::default().fg(accent())),
                Span::styled(" choose an image or video", Style::default().fg(text_dim())),
            ]),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn preview_lines(preview: &Preview) -> Vec<Line<'static>> {
    let label = |k: &str, v: String| {
        Line::from(vec![
            Span::styled(format!("  {:<6}", k), Style::default().fg(text_dim())),
            Span::styled(v, Style::default().fg(text())),
        ])
    };

    let mut lines = vec![Line::from("")];
    match preview.kind {
        MediaKind::Image => {
            lines.push(Line::from(Span::styled("  󰋩 Image preview", Style::default().fg(accent()).add_modifier(Modifier::BOLD))));
            lines.push(Line::from(""));
            lines.push(label("File", preview.name.clone()));
            lines.push(label("Type", preview.mime.clone()));
            if let Some((w, h)) = preview.dimensions {
                lines.push(label("Size", format!("{}×{}", w, h)));
            }
        }
        MediaKind::Video => {
            lines.push(Line::from(Span::styled("  󰕧 Video preview", Style::default().fg(accent()).add_modifier(Modifier::BOLD))));
            lines.push(Line::from(""));
            lines.push(label("File", preview.name.clone()));
            lines.push(label("Type", preview.mime.clone()));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  ▶ ", Style::default().fg(accent())),
                Span::styled("━━━━━━━━━━━━━━━━", Style::default().fg(inactive())),
                Span::styled(" 00:00", Style::default().fg(text_dim())),
            ]));
        }
    }
    if let Some(bytes) = preview.size {
        lines.push(label("Bytes", format_bytes(bytes)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  x", Style::default().fg(danger())),
        Span::styled(" Remove", Style::default().fg(text_dim())),
        Span::styled("  │  ", Style::default().fg(inactive())),
        Span::styled("Enter", Style::default().fg(accent())),
        Span::styled(" Replace", Style::default().fg(text_dim())),
    ]));
    lines
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Chips => vec![("←→", "Nav"), ("x", "Remove"), ("Tab", "Next"), ("^S", "Post"), ("?", "Help")],
        Section::Platforms => vec![("↑↓", "Nav"), ("Space", "Toggle"), ("Tab", "Next"), ("^S", "Post"), ("?", "Help")],
        Section::Mode => vec![("Space", "Switch"), ("Tab", "Next"), ("^S", "Post"), ("?", "Help")],
        Section::Caption => vec![("Type", "Edit"), ("Esc", "Done"), ("Tab", "Next"), ("^S", "Post")],
        Section::Media if app.composer.attachment().is_some() => {
            vec![("Enter", "Replace"), ("x", "Remove"), ("Tab", "Next"), ("^S", "Post")]
        }
        Section::Media => vec![("Enter", "Browse"), ("Tab", "Next"), ("^S", "Post")],
        Section::Post => vec![("Enter", app.composer.mode().button_label()), ("Tab", "Next"), ("q", "Quit")],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3.min(hints.len()) } else { hints.len() };

    let footer = Paragraph::new(hint_line(&hints[..max_hints]))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn hint_line<'a>(hints: &[(&'a str, &'a str)]) -> Line<'a> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (i, (key, action)) in hints.iter().enumerate() {
        let sep = if i + 1 < hints.len() { " │ " } else { "" };
        spans.push(Span::styled(*key, Style::default().fg(accent())));
        spans.push(Span::styled(format!(" {}{}", action, sep), Style::default().fg(text_dim())));
    }
    Line::from(spans)
}

/// Picker rows: icon, name and what the composer would make of the file
fn browser_row(entry: &BrowserEntry) -> Row<'_> {
    let (icon, kind, color) = if entry.is_dir {
        ("󰉋", "folder", accent())
    } else {
        match declared_mime(&entry.path) {
            UNKNOWN_MIME => ("󰈔", "other", text_dim()),
            mime => match MediaKind::from_mime(mime) {
                MediaKind::Image => ("󰋩", "image", success()),
                MediaKind::Video => ("󰕧", "video", warning()),
            },
        }
    };

    Row::new(vec![
        Span::styled(icon, Style::default().fg(color)),
        Span::styled(entry.name.as_str(), Style::default().fg(text())),
        Span::styled(kind, Style::default().fg(text_dim())),
    ])
}

fn draw_file_browser(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 65 },
        if area.height < 30 { 85 } else { 70 },
        area
    );
    f.render_widget(Clear, popup_area);

    let browser = &app.browser;
    let title = if browser.media_only { " 󰈔 Attach Media " } else { " 󰈔 Attach Media (all files) " };
    let block = section_block(title, true);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let [path_area, list_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new(browser.path.to_string_lossy())
            .style(Style::default().fg(text_dim())),
        path_area,
    );

    if browser.entries.is_empty() {
        let empty = if browser.media_only { "No images or videos here (a: show all)" } else { "Empty directory" };
        f.render_widget(
            Paragraph::new(empty).style(Style::default().fg(inactive())),
            list_area,
        );
    } else {
        let table = Table::new(
            browser.entries.iter().map(browser_row),
            [Constraint::Length(2), Constraint::Fill(1), Constraint::Length(6)],
        )
        .row_highlight_style(Style::default().bg(bg_selected()).add_modifier(Modifier::BOLD));
        // Stateful so long directories scroll with the cursor
        let mut state = TableState::default().with_selected(Some(browser.selected));
        f.render_stateful_widget(table, list_area, &mut state);
    }

    let filter = if browser.media_only { "Show all" } else { "Media only" };
    let hints = [("↑↓", "Nav"), ("Enter", "Open"), ("⌫", "Up"), ("a", filter), ("Esc", "Cancel")];
    f.render_widget(
        Paragraph::new(hint_line(&hints)).alignment(Alignment::Center),
        hint_area,
    );
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 40 { 95 } else { 85 },
        area
    );

    f.render_widget(Clear, popup_area);

    let heading = |s: &'static str| {
        Line::from(Span::styled(s, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let item = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        item("  Tab       ", "Next section (Selected → Platforms → Mode → Caption → Media → Post)"),
        item("  Shift-Tab ", "Previous section"),
        item("  ↑/↓ j/k   ", "Move in the platform list"),
        Line::from(""),
        heading("═══ Composing ═══"),
        item("  Space     ", "Toggle platform / switch Instant ↔ Scheduled"),
        item("  x         ", "Remove selected chip or attached media"),
        item("  Enter     ", "Open the media picker (Media section)"),
        item("  Esc       ", "Leave the caption editor"),
        Line::from(""),
        heading("═══ Posting ═══"),
        item("  Ctrl-S    ", "Post from anywhere"),
        Line::from(vec![
            Span::raw("            Needs a caption or media; the mode is kept after posting"),
        ]),
        Line::from(""),
        heading("═══ Media Picker ═══"),
        item("  a         ", "Show all files / only images & videos"),
        item("  ~         ", "Jump to home directory"),
        Line::from(""),
        item("  q Ctrl-C  ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 crosspost Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
