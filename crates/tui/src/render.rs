use almanac_core::{
    datasets::{is_high_value, Region, NATIONS},
    AcquiredSet, BoardManager, Category, Companion, Highlighter, Item, PageSnapshot, PageView,
    Presenter, Progress, TradeRoute,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::input::TextInput;
use crate::tabs::{
    AzizahTab, BoardTab, CrewTab, FormField, ItemsTab, LoadStatus, PostForm, RoutesTab,
};

const PAGE_WINDOW: usize = 2;
const NATION_COLUMN_WIDTH: u16 = 9;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            highlight_bg: Color::Yellow,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn matched(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }
}

/// Spans of `text` with occurrences of the term marked.
fn highlighted(
    text: &str,
    highlighter: &Highlighter,
    base: Style,
    theme: &Theme,
) -> Line<'static> {
    let spans: Vec<Span<'static>> = highlighter
        .segments(text)
        .into_iter()
        .map(|segment| {
            let style = if segment.matched {
                theme.matched()
            } else {
                base
            };
            Span::styled(segment.text.to_string(), style)
        })
        .collect();
    Line::from(spans)
}

fn loading_placeholder(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    status: &LoadStatus,
    theme: &Theme,
) {
    let (message, style) = match status {
        LoadStatus::Idle | LoadStatus::Loading => (
            "불러오는 중…".to_string(),
            Style::default().fg(theme.muted),
        ),
        LoadStatus::Failed(err) => (
            format!("데이터를 불러올 수 없습니다: {err}  (Ctrl+R 다시 시도)"),
            Style::default().fg(theme.danger),
        ),
        LoadStatus::Ready => (String::new(), Style::default()),
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(message, style)))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// "‹ 1 2 [3] 4 5 ›  41–41 / 41" style navigation line.
pub fn pagination_line(view: &PageView, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    let arrow = |enabled: bool, glyph: &'static str| {
        Span::styled(
            glyph,
            if enabled {
                Style::default().fg(theme.accent)
            } else {
                Style::default().fg(theme.muted)
            },
        )
    };
    spans.push(arrow(view.has_previous(), "‹ "));
    for page in view.window(PAGE_WINDOW) {
        if page == view.page {
            spans.push(Span::styled(
                format!("[{page}] "),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!("{page} ")));
        }
    }
    spans.push(arrow(view.has_next(), "›"));
    let range = match view.row_range() {
        Some((first, last)) => format!("   {first}–{last} / {}", view.total_items),
        None => "   0 / 0".to_string(),
    };
    spans.push(Span::styled(range, Style::default().fg(theme.muted)));
    Line::from(spans)
}

fn filter_label(name: &str, value: Option<String>, theme: &Theme) -> Vec<Span<'static>> {
    let value_style = if value.is_some() {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.muted)
    };
    vec![
        Span::raw(format!("{name}:")),
        Span::styled(value.unwrap_or_else(|| "전체".to_string()), value_style),
        Span::raw("  "),
    ]
}

fn region_text(item: &Item) -> String {
    match &item.region {
        Some(Region::Fixed(name)) => name.clone(),
        Some(Region::PerGroup(pair)) => pair
            .iter()
            .map(|(group, name)| format!("{}: {name}", group.label()))
            .collect::<Vec<_>>()
            .join(" / "),
        None => "-".to_string(),
    }
}

struct ItemRows<'a> {
    theme: &'a Theme,
    acquired: &'a AcquiredSet,
    rows: Vec<Row<'static>>,
}

impl Presenter<Item> for ItemRows<'_> {
    fn present(&mut self, page: &PageSnapshot<'_, Item>) {
        let highlighter = Highlighter::new(page.term);
        self.rows = page
            .items
            .iter()
            .map(|item| {
                let owned = self.acquired.is_acquired(&item.key);
                let mark = if owned {
                    Span::styled("✔", Style::default().fg(self.theme.success))
                } else {
                    Span::styled("·", Style::default().fg(self.theme.muted))
                };
                let name = highlighted(
                    item.display_name(),
                    &highlighter,
                    Style::default().fg(self.theme.primary_fg),
                    self.theme,
                );
                let effect = item
                    .effect
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                Row::new(vec![
                    Cell::from(Line::from(mark)),
                    Cell::from(name),
                    Cell::from(item.category.label()),
                    Cell::from(item.position.clone().unwrap_or_default()),
                    Cell::from(effect),
                    Cell::from(region_text(item)),
                ])
            })
            .collect();
    }
}

pub fn render_items(
    frame: &mut Frame,
    area: Rect,
    tab: &ItemsTab,
    acquired: &AcquiredSet,
    progress: Option<Progress>,
    theme: &Theme,
) {
    let Some(view) = tab.view.as_ref().filter(|_| tab.status == LoadStatus::Ready) else {
        loading_placeholder(frame, area, "아이템", &tab.status, theme);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(9),
        ])
        .split(area);

    let criteria = &tab.criteria;
    let mut filters = Vec::new();
    filters.extend(filter_label(
        "[c]종류",
        criteria.category().map(|c| c.label().to_string()),
        theme,
    ));
    if criteria.category() == Some(Category::Equipment) {
        filters.extend(filter_label(
            "[o]보직",
            criteria.position().map(str::to_string),
            theme,
        ));
    }
    filters.extend(filter_label(
        "[r]지역",
        criteria.region().map(str::to_string),
        theme,
    ));
    filters.extend(filter_label(
        "[g]캐릭터",
        criteria.group().map(|g| g.label().to_string()),
        theme,
    ));
    filters.extend(filter_label(
        "[m]주인공",
        criteria.protagonist().map(|p| p.label().to_string()),
        theme,
    ));
    filters.extend(filter_label(
        "[a]획득",
        Some(criteria.acquired().label().to_string()).filter(|_| {
            criteria.acquired() != almanac_core::datasets::AcquiredFilter::All
        }),
        theme,
    ));
    frame.render_widget(Paragraph::new(Line::from(filters)), chunks[0]);

    let mut presenter = ItemRows {
        theme,
        acquired,
        rows: Vec::new(),
    };
    view.present(&mut presenter);

    let mut title = format!(
        "아이템 · 전체 {}개 중 {}개",
        view.total(),
        view.filtered_len()
    );
    if let Some(progress) = progress {
        title.push_str(&format!(
            " · 획득 {}/{} ({}%)",
            progress.acquired, progress.total, progress.percent
        ));
    }
    if !view.term().is_empty() {
        title.push_str(&format!(" · \"{}\"", view.term().raw()));
    }

    let header = Row::new(vec!["", "이름", "종류", "보직", "효과", "지역"])
        .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    let table = Table::new(
        presenter.rows,
        [
            Constraint::Length(2),
            Constraint::Percentage(28),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Percentage(18),
            Constraint::Percentage(40),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().bg(theme.selection_bg));
    let mut state = TableState::default();
    if !view.page_view().is_empty() {
        state.select(Some(tab.cursor));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);

    frame.render_widget(
        Paragraph::new(pagination_line(&view.page_view(), theme)),
        chunks[2],
    );
    render_item_detail(frame, chunks[3], tab.selected(), acquired, theme);
}

fn render_item_detail(
    frame: &mut Frame,
    area: Rect,
    item: Option<&Item>,
    acquired: &AcquiredSet,
    theme: &Theme,
) {
    let block = Block::default().borders(Borders::ALL).title("상세");
    let Some(item) = item else {
        frame.render_widget(Paragraph::new("검색 결과가 없습니다").block(block), area);
        return;
    };
    frame.render_widget(
        Paragraph::new(item_detail_lines(item, acquired, theme))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn item_detail_lines(
    item: &Item,
    acquired: &AcquiredSet,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            item.display_name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", item.index.as_deref().unwrap_or("")),
            Style::default().fg(theme.muted),
        ),
        Span::raw(if acquired.is_acquired(&item.key) {
            "  (획득함)"
        } else {
            ""
        }),
    ])];
    if let Some(effect) = &item.effect {
        let heading = if item.category == Category::Figurehead {
            "선수상 능력: "
        } else {
            "효과: "
        };
        lines.push(Line::from(vec![label(heading), Span::raw(effect.to_string())]));
    }
    for (group, location) in item.location.iter() {
        lines.push(Line::from(vec![
            label("위치 "),
            Span::raw(format!("{}: {location}", group.label())),
        ]));
    }
    if let Some(condition) = &item.condition {
        lines.push(Line::from(vec![label("획득 조건: "), Span::raw(condition.text())]));
    }
    if let Some(usage) = &item.usage {
        lines.push(Line::from(vec![label("사용처: "), Span::raw(usage.clone())]));
    }
    if let Some(hostess) = &item.hostess_location {
        lines.push(Line::from(vec![
            label("좋아하는 여급 위치: "),
            Span::raw(hostess.clone()),
        ]));
    }
    let named = item.named_protagonists();
    if !named.is_empty() {
        let names: Vec<&str> = named.iter().map(|p| p.label()).collect();
        lines.push(Line::from(vec![
            label("획득 가능 주인공: "),
            Span::raw(names.join(", ")),
        ]));
    }
    lines
}

struct RouteRows<'a> {
    theme: &'a Theme,
    nations: &'a [&'static str],
    first_nation: usize,
    threshold: i64,
    rows: Vec<Row<'static>>,
}

impl Presenter<TradeRoute> for RouteRows<'_> {
    fn present(&mut self, page: &PageSnapshot<'_, TradeRoute>) {
        let highlighter = Highlighter::new(page.term);
        let base = Style::default().fg(self.theme.primary_fg);
        self.rows = page
            .items
            .iter()
            .map(|route| {
                let mut cells = vec![
                    Cell::from(highlighted(&route.region, &highlighter, base, self.theme)),
                    Cell::from(highlighted(&route.culture, &highlighter, base, self.theme)),
                    Cell::from(highlighted(&route.city, &highlighter, base, self.theme)),
                    Cell::from(highlighted(&route.kind, &highlighter, base, self.theme)),
                    Cell::from(highlighted(&route.commodity, &highlighter, base, self.theme)),
                    Cell::from(
                        route
                            .development
                            .map(|value| value.to_string())
                            .unwrap_or_default(),
                    ),
                ];
                for offset in 0..self.nations.len() {
                    let price = route
                        .prices
                        .get(self.first_nation + offset)
                        .copied()
                        .flatten();
                    let cell = match price {
                        Some(price) if is_high_value(price, self.threshold) => Cell::from(
                            Span::styled(
                                price.to_string(),
                                Style::default()
                                    .fg(self.theme.warning)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        ),
                        Some(price) => Cell::from(price.to_string()),
                        None => Cell::from(Span::styled(
                            "-",
                            Style::default().fg(self.theme.muted),
                        )),
                    };
                    cells.push(cell);
                }
                Row::new(cells)
            })
            .collect();
    }
}

pub fn render_routes(
    frame: &mut Frame,
    area: Rect,
    tab: &RoutesTab,
    threshold: i64,
    theme: &Theme,
) {
    let Some(view) = tab.view.as_ref().filter(|_| tab.status == LoadStatus::Ready) else {
        loading_placeholder(frame, area, "황금항로", &tab.status, theme);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let criteria = &tab.criteria;
    let mut filters = Vec::new();
    filters.extend(filter_label("[r]지역", criteria.region.clone(), theme));
    filters.extend(filter_label("[c]도시", criteria.city.clone(), theme));
    filters.extend(filter_label("[t]종류", criteria.kind.clone(), theme));
    filters.extend(filter_label("[m]상품", criteria.commodity.clone(), theme));
    frame.render_widget(Paragraph::new(Line::from(filters)), chunks[0]);

    const FIXED_WIDTH: u16 = 10 + 8 + 10 + 8 + 12 + 6 + 6;
    let room = chunks[1].width.saturating_sub(FIXED_WIDTH + 2);
    let columns = usize::from((room / NATION_COLUMN_WIDTH).max(1));
    let all: &'static [&'static str] = &NATIONS;
    let first = tab.nation_offset.min(all.len() - 1);
    let nations = &all[first..(first + columns).min(all.len())];

    let mut presenter = RouteRows {
        theme,
        nations,
        first_nation: first,
        threshold,
        rows: Vec::new(),
    };
    view.present(&mut presenter);

    let mut header = vec!["지역", "문화권", "도시", "종류", "상품", "개발도"];
    header.extend(nations.iter().copied());
    let header =
        Row::new(header).style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    let mut widths = vec![
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(6),
    ];
    widths.extend(nations.iter().map(|_| Constraint::Length(NATION_COLUMN_WIDTH)));

    let title = format!(
        "황금항로 [{}] · 전체 {}개 중 {}개 · 가격 {}–{} / {} (h/l 이동) · {} 이상 강조",
        tab.table.as_ref().map_or("", |table| table.sheet()),
        view.total(),
        view.filtered_len(),
        first + 1,
        first + nations.len(),
        NATIONS.len(),
        threshold
    );
    let table = Table::new(presenter.rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(theme.selection_bg));
    let mut state = TableState::default();
    if !view.page_view().is_empty() {
        state.select(Some(tab.cursor));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);

    let mut footer = pagination_line(&view.page_view(), theme);
    if let Some((nation, price)) = tab.selected().and_then(TradeRoute::best_price) {
        footer.spans.push(Span::styled(
            format!("   최고가: {nation} {price}"),
            Style::default().fg(theme.success),
        ));
    }
    frame.render_widget(Paragraph::new(footer), chunks[2]);
}

struct CrewRows<'a> {
    theme: &'a Theme,
    character: Option<&'a str>,
    rows: Vec<Row<'static>>,
}

impl Presenter<Companion> for CrewRows<'_> {
    fn present(&mut self, page: &PageSnapshot<'_, Companion>) {
        let highlighter = Highlighter::new(page.term);
        self.rows = page
            .items
            .iter()
            .map(|companion| {
                let name = highlighted(
                    &companion.name,
                    &highlighter,
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                    self.theme,
                );
                Row::new(vec![
                    Cell::from(name),
                    Cell::from(companion.summary(self.character)),
                ])
            })
            .collect();
    }
}

pub fn render_crew(frame: &mut Frame, area: Rect, tab: &CrewTab, theme: &Theme) {
    let Some(view) = tab.view.as_ref().filter(|_| tab.status == LoadStatus::Ready) else {
        loading_placeholder(frame, area, "일반동료", &tab.status, theme);
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(filter_label(
            "[m]주인공",
            tab.criteria.character.clone(),
            theme,
        ))),
        chunks[0],
    );

    let mut presenter = CrewRows {
        theme,
        character: tab.criteria.character.as_deref(),
        rows: Vec::new(),
    };
    view.present(&mut presenter);

    let title = format!(
        "일반동료 · 전체 {}명 중 {}명의 동료",
        view.total(),
        view.filtered_len()
    );
    let table = Table::new(
        presenter.rows,
        [Constraint::Length(16), Constraint::Min(20)],
    )
    .header(
        Row::new(vec!["이름", "영입 조건"])
            .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().bg(theme.selection_bg));
    let mut state = TableState::default();
    if !view.page_view().is_empty() {
        state.select(Some(tab.cursor));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);
    frame.render_widget(
        Paragraph::new(pagination_line(&view.page_view(), theme)),
        chunks[2],
    );
}

pub fn render_azizah(frame: &mut Frame, area: Rect, tab: &AzizahTab, theme: &Theme) {
    let Some(guide) = tab.guide.as_ref() else {
        loading_placeholder(frame, area, "아지자", &tab.status, theme);
        return;
    };
    let mut lines = Vec::new();
    for (idx, requirement) in guide.requirements.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}. {}", idx + 1, requirement.title()),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(requirement.description.clone()),
        ]));
        for detail in requirement.details() {
            lines.push(Line::from(format!("   • {detail}")));
        }
        lines.push(Line::from(""));
    }
    if !guide.notes.is_empty() {
        lines.push(Line::from(Span::styled(
            "중요 참고사항",
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        )));
        for note in &guide.notes {
            lines.push(Line::from(format!("   • {note}")));
        }
    }
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("특수동료 아지자 (j/k 스크롤)"),
        )
        .wrap(Wrap { trim: false })
        .scroll((tab.scroll, 0));
    frame.render_widget(paragraph, area);
}

pub fn render_board(
    frame: &mut Frame,
    area: Rect,
    tab: &BoardTab,
    board: &BoardManager,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let posts = tab.visible(board);
    let highlighter = Highlighter::new(&tab.term);
    let acting = tab.author.value();
    let rows: Vec<Row> = posts
        .iter()
        .map(|post| {
            let mine = board.can_modify(post, acting);
            let title = highlighted(
                &post.title,
                &highlighter,
                Style::default().add_modifier(if mine {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                }),
                theme,
            );
            Row::new(vec![
                Cell::from(format!("#{}", post.id)),
                Cell::from(title),
                Cell::from(highlighted(&post.author, &highlighter, Style::default(), theme)),
                Cell::from(post.date.format("%Y-%m-%d").to_string()),
            ])
        })
        .collect();

    let mut title = format!("게시판 · {}개 · 정렬 {}", posts.len(), tab.sort.label());
    if !tab.term.is_empty() {
        title.push_str(&format!(" · \"{}\"", tab.term.raw()));
    }
    if board.developer_mode() {
        title.push_str(" · 개발자 모드");
    }
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().bg(theme.selection_bg));
    let mut state = TableState::default();
    if !posts.is_empty() {
        state.select(Some(tab.cursor));
    }
    frame.render_stateful_widget(table, chunks[0], &mut state);

    let author_line = Line::from(vec![
        Span::styled("작성자: ", Style::default().fg(theme.accent)),
        Span::raw(if acting.is_empty() {
            "(미설정, u 로 입력)".to_string()
        } else {
            acting.to_string()
        }),
    ]);
    let mut lines = vec![author_line, Line::from("")];
    match posts.get(tab.cursor) {
        Some(post) => {
            lines.push(Line::from(Span::styled(
                post.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "{} · {} · 조회 {}",
                    post.author,
                    post.date.format("%Y-%m-%d %H:%M"),
                    post.views
                ),
                Style::default().fg(theme.muted),
            )));
            lines.push(Line::from(""));
            lines.extend(post.content.lines().map(|line| Line::from(line.to_string())));
        }
        None => lines.push(Line::from("게시글이 없습니다. w 로 새 글을 작성하세요.")),
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("내용"))
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    if let Some(form) = &tab.form {
        render_post_form(frame, form, theme);
    } else if let Some(id) = tab.confirm_delete {
        render_confirm(frame, &format!("게시글 #{id} 을(를) 삭제하시겠습니까? (y/n)"), theme);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_post_form(frame: &mut Frame, form: &PostForm, theme: &Theme) {
    let area = centered_rect(64, 9, frame.size());
    frame.render_widget(Clear, area);
    let title = match form.editing {
        Some(id) => format!("게시글 #{id} 수정"),
        None => "새 게시글".to_string(),
    };
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus == field;
        let marker = if focused { "▶ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker}{:<4} ", field.label()),
                if focused {
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.muted)
                },
            ),
            Span::raw(form.field(field).value().to_string()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" 저장  "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" 다음 칸  "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" 취소"),
    ]));
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );

    let row = FormField::ALL
        .iter()
        .position(|field| *field == form.focus)
        .unwrap_or(0) as u16;
    let offset = 2 + 4 * 2 + 1 + form.field(form.focus).cursor_width() as u16;
    frame.set_cursor(
        (area.x + 1 + offset).min(area.x + area.width.saturating_sub(2)),
        area.y + 1 + row,
    );
}

fn render_confirm(frame: &mut Frame, message: &str, theme: &Theme) {
    let area = centered_rect(50, 3, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.danger),
        )))
        .block(Block::default().borders(Borders::ALL).title("확인")),
        area,
    );
}

/// One-line prompt drawn over the status bar while typing.
pub fn render_prompt(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &TextInput,
    theme: &Theme,
) {
    let line = Line::from(vec![
        Span::styled(format!("{label}> "), Style::default().fg(theme.accent)),
        Span::raw(input.value().to_string()),
    ]);
    let paragraph = Paragraph::new(vec![
        line,
        Line::from(Span::styled(
            "Enter 적용 · Esc 취소",
            Style::default().fg(theme.muted),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("입력"));
    frame.render_widget(paragraph, area);
    let prefix = label.chars().count() * 2 + 2;
    frame.set_cursor(
        (area.x + 1 + (prefix + input.cursor_width()) as u16)
            .min(area.x + area.width.saturating_sub(2)),
        area.y + 1,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::{ItemCatalog, RouteTable, SearchTerm};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn highlight_segments(text: &str, term: &SearchTerm) -> Vec<(String, bool)> {
        let theme = Theme::default();
        highlighted(text, &Highlighter::new(term), Style::default(), &theme)
            .spans
            .iter()
            .map(|span| (span.content.to_string(), span.style == theme.matched()))
            .collect()
    }

    #[test]
    fn pagination_shows_window_and_range() {
        let theme = Theme::default();
        let view = PageView::new(3, 20, 41);
        let text: String = pagination_line(&view, &theme)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(text, "‹ 1 2 [3] ›   41–41 / 41");
    }

    #[test]
    fn highlight_marks_every_occurrence() {
        let segments = highlight_segments("Saber saber", &SearchTerm::new("SABER"));
        assert_eq!(
            segments,
            vec![
                ("Saber".to_string(), true),
                (" ".to_string(), false),
                ("saber".to_string(), true)
            ]
        );
    }

    #[test]
    fn item_detail_lists_usage_and_hostess() {
        let catalog = ItemCatalog::from_slice(
            r#"[
                {"인덱스": "item_p_001", "이름": "육두구", "지역": "동남아시아",
                 "사용처": "향료 상인"},
                {"인덱스": "item_g_002", "이름": "비단 부채", "조건": "티알 전용",
                 "좋아하는 여급 위치": "나가사키"}
            ]"#
            .as_bytes(),
        )
        .expect("catalog parses");
        let theme = Theme::default();
        let acquired = AcquiredSet::default();

        let nutmeg: Vec<String> = item_detail_lines(
            catalog.get("item_p_001").expect("specialty"),
            &acquired,
            &theme,
        )
        .iter()
        .map(line_text)
        .collect();
        assert!(nutmeg.contains(&"사용처: 향료 상인".to_string()), "{nutmeg:?}");

        let fan: Vec<String> = item_detail_lines(
            catalog.get("item_g_002").expect("gift"),
            &acquired,
            &theme,
        )
        .iter()
        .map(line_text)
        .collect();
        assert!(fan.contains(&"획득 조건: 티알 전용".to_string()), "{fan:?}");
        assert!(fan.contains(&"좋아하는 여급 위치: 나가사키".to_string()), "{fan:?}");
    }

    #[test]
    fn route_table_shows_culture_column() {
        let table = RouteTable::from_slice(
            br#"{"Sheet1": {"columns": [], "data": [
                ["Europe", "Latin", "Lisbon", "Food", "Wine", 10, 320]
            ]}}"#,
            None,
        )
        .expect("route table parses");
        let mut tab = RoutesTab::new(15);
        tab.set_table(Arc::new(table));

        let mut terminal = Terminal::new(TestBackend::new(140, 10)).expect("test terminal");
        terminal
            .draw(|frame| render_routes(frame, frame.size(), &tab, 500, &Theme::default()))
            .expect("draw routes");
        let buffer = terminal.backend().buffer().clone();
        let rows: Vec<String> = (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
                    .replace(' ', "")
            })
            .collect();
        assert!(rows.iter().any(|row| row.contains("지역문화권도시")), "{rows:#?}");
        assert!(rows.iter().any(|row| row.contains("EuropeLatinLisbon")), "{rows:#?}");
    }
}
