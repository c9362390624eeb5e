use std::{io, sync::Arc, thread, time::Duration};

use almanac_core::{
    AcquiredTracker, AppConfig, BoardManager, CrewRoster, DataEvent, Dataset, DatasetLoader,
    ItemCatalog, LoadError, RouteTable, SpecialCompanion,
};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info, warn};

use crate::{
    input::TextInput,
    render::{self, Theme},
    tabs::{AzizahTab, BoardTab, CrewTab, ItemsTab, LoadStatus, PostForm, RoutesTab, Tab},
};

const TICK_RATE: Duration = Duration::from_millis(250);

enum AppEvent {
    Input(Event),
    Tick,
    /// A dataset finished loading; tagged with the reload generation it
    /// was requested in.
    Loaded(u64, LoadedDataset),
}

enum LoadedDataset {
    Items(Result<Arc<ItemCatalog>, LoadError>),
    Routes(Result<Arc<RouteTable>, LoadError>),
    Crew(Result<Arc<CrewRoster>, LoadError>),
    Azizah(Result<Arc<SpecialCompanion>, LoadError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Author,
}

/// Terminal almanac: five tabs over the shared search pipeline.
pub struct AlmanacApp {
    config: AppConfig,
    loader: DatasetLoader,
    tracker: AcquiredTracker,
    board: BoardManager,
    tab: Tab,
    items: ItemsTab,
    routes: RoutesTab,
    crew: CrewTab,
    azizah: AzizahTab,
    board_tab: BoardTab,
    mode: Mode,
    prompt: TextInput,
    term_backup: String,
    generation: u64,
    status: String,
    should_quit: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    data_rx: Option<mpsc::Receiver<DataEvent>>,
    theme: Theme,
}

impl AlmanacApp {
    pub fn new(
        config: AppConfig,
        loader: DatasetLoader,
        tracker: AcquiredTracker,
        board: BoardManager,
    ) -> Self {
        let status = format!("데이터 원본: {}", loader.source());
        Self {
            items: ItemsTab::new(config.item_page_size),
            routes: RoutesTab::new(config.route_page_size),
            crew: CrewTab::new(config.crew_page_size),
            azizah: AzizahTab::default(),
            board_tab: BoardTab::default(),
            config,
            loader,
            tracker,
            board,
            tab: Tab::Items,
            mode: Mode::Browse,
            prompt: TextInput::default(),
            term_backup: String::new(),
            generation: 0,
            status,
            should_quit: false,
            event_tx: None,
            data_rx: None,
            theme: Theme::default(),
        }
    }

    /// Receive change notifications for the data directory.
    pub fn attach_data_events(&mut self, receiver: mpsc::Receiver<DataEvent>) {
        self.data_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);
        self.ensure_loaded();

        let mut data_rx = self.data_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            if let Some(rx) = data_rx.as_mut() {
                let mut data_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_data = rx.recv() => {
                        match maybe_data {
                            Some(event) => self.handle_data_event(event),
                            None => data_closed = true,
                        }
                    }
                }
                if data_closed {
                    data_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    error!(?err, "input handling failed");
                    self.status = format!("오류: {err}");
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::Loaded(generation, loaded)) => {
                if generation == self.generation {
                    self.handle_loaded(loaded);
                } else {
                    debug!(generation, current = self.generation, "discarding stale dataset");
                }
                true
            }
            None => false,
        }
    }

    /// Start loading the dataset behind the active tab if it has not been
    /// requested yet.
    fn ensure_loaded(&mut self) {
        if self.event_tx.is_none() {
            return;
        }
        match self.tab {
            Tab::Items if self.items.status.needs_load() => {
                self.items.status = LoadStatus::Loading;
                self.spawn_load::<ItemCatalog>(LoadedDataset::Items);
            }
            Tab::Routes if self.routes.status.needs_load() => {
                self.routes.status = LoadStatus::Loading;
                self.spawn_load::<RouteTable>(LoadedDataset::Routes);
            }
            Tab::Crew if self.crew.status.needs_load() => {
                self.crew.status = LoadStatus::Loading;
                self.spawn_load::<CrewRoster>(LoadedDataset::Crew);
            }
            Tab::Azizah if self.azizah.status.needs_load() => {
                self.azizah.status = LoadStatus::Loading;
                self.spawn_load::<SpecialCompanion>(LoadedDataset::Azizah);
            }
            _ => {}
        }
    }

    fn spawn_load<T: Dataset>(&self, wrap: fn(Result<Arc<T>, LoadError>) -> LoadedDataset) {
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        let loader = self.loader.clone();
        let generation = self.generation;
        debug!(dataset = T::NAME, generation, "loading dataset");
        spawn(async move {
            let result = loader.load::<T>().await;
            if sender
                .send(AppEvent::Loaded(generation, wrap(result)))
                .await
                .is_err()
            {
                debug!(dataset = T::NAME, "app closed before dataset arrived");
            }
        });
    }

    fn handle_loaded(&mut self, loaded: LoadedDataset) {
        match loaded {
            LoadedDataset::Items(Ok(catalog)) => {
                info!(items = catalog.len(), "item catalog ready");
                self.items.set_catalog(catalog, self.tracker.set());
                self.status = self.result_summary();
            }
            LoadedDataset::Routes(Ok(table)) => {
                info!(routes = table.len(), sheet = table.sheet(), "trade routes ready");
                self.routes.set_table(table);
                self.status = self.result_summary();
            }
            LoadedDataset::Crew(Ok(roster)) => {
                info!(companions = roster.len(), "crew roster ready");
                self.crew.set_roster(roster);
                self.status = self.result_summary();
            }
            LoadedDataset::Azizah(Ok(guide)) => {
                info!(requirements = guide.requirements.len(), "azizah guide ready");
                self.azizah.set_guide(guide);
            }
            LoadedDataset::Items(Err(err)) => {
                self.status = load_failed(&mut self.items.status, ItemCatalog::NAME, &err);
            }
            LoadedDataset::Routes(Err(err)) => {
                self.status = load_failed(&mut self.routes.status, RouteTable::NAME, &err);
            }
            LoadedDataset::Crew(Err(err)) => {
                self.status = load_failed(&mut self.crew.status, CrewRoster::NAME, &err);
            }
            LoadedDataset::Azizah(Err(err)) => {
                self.status = load_failed(&mut self.azizah.status, SpecialCompanion::NAME, &err);
            }
        }
    }

    fn handle_data_event(&mut self, event: DataEvent) {
        match event {
            DataEvent::Changed(paths) => {
                info!(files = paths.len(), "dataset files changed");
                self.reload("데이터 파일 변경");
            }
            DataEvent::Error(err) => {
                warn!(%err, "data watcher error");
                self.status = format!("데이터 감시 오류: {err}");
            }
        }
    }

    /// Drop cached datasets and load the active tab again. Criteria survive.
    fn reload(&mut self, reason: &str) {
        self.loader.reload();
        self.generation += 1;
        self.items.reset();
        self.routes.reset();
        self.crew.reset();
        self.azizah.reset();
        info!(reason, generation = self.generation, "reloading datasets");
        self.ensure_loaded();
        self.status = format!("데이터를 다시 불러옵니다 ({reason})");
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        self.ensure_loaded();
        self.status = self.result_summary();
    }

    fn result_summary(&self) -> String {
        match self.tab {
            Tab::Items => self.items.view.as_ref().map(|view| {
                let mut summary = format!(
                    "아이템 {}개 중 {}개 표시",
                    view.total(),
                    view.filtered_len()
                );
                if self.items.filters_active() {
                    summary.push_str(" · 필터 적용 중");
                }
                summary
            }),
            Tab::Routes => self.routes.view.as_ref().map(|view| {
                format!(
                    "교역품 {}개 중 {}개 표시",
                    view.total(),
                    view.filtered_len()
                )
            }),
            Tab::Crew => self.crew.view.as_ref().map(|view| {
                format!(
                    "동료 {}명 중 {}명 표시",
                    view.total(),
                    view.filtered_len()
                )
            }),
            Tab::Azizah => None,
            Tab::Board => Some(format!(
                "게시글 {}개 중 {}개 표시",
                self.board.posts().len(),
                self.board_tab.visible(&self.board).len()
            )),
        }
        .unwrap_or_default()
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.board_tab.form.is_some() {
            return self.handle_form_key(key);
        }
        if self.board_tab.confirm_delete.is_some() {
            return self.handle_confirm_key(key);
        }
        match self.mode {
            Mode::Search => {
                self.handle_search_key(key);
                Ok(())
            }
            Mode::Author => {
                self.handle_author_key(key);
                Ok(())
            }
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.reload("수동"),
            KeyCode::Char('d') if ctrl => {
                let enabled = self.board.toggle_developer_mode()?;
                self.status = if enabled {
                    "개발자 모드 켜짐: 모든 게시글을 수정할 수 있습니다".to_string()
                } else {
                    "개발자 모드 꺼짐".to_string()
                };
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.previous()),
            KeyCode::Char(ch @ '1'..='5') => {
                let idx = ch as usize - '1' as usize;
                self.switch_tab(Tab::ALL[idx]);
            }
            KeyCode::Char('/') => self.begin_search(),
            KeyCode::Esc => self.clear_term(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageDown | KeyCode::Char('n') => self.change_page(true),
            KeyCode::PageUp | KeyCode::Char('p') => self.change_page(false),
            _ => return self.handle_tab_key(key),
        }
        Ok(())
    }

    fn handle_tab_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.tab {
            Tab::Items => self.handle_items_key(key)?,
            Tab::Routes => self.handle_routes_key(key),
            Tab::Crew => match key.code {
                KeyCode::Char('m') => self.crew.cycle_character(),
                KeyCode::Char('x') => self.crew.clear_filters(),
                KeyCode::Left => self.change_page(false),
                KeyCode::Right => self.change_page(true),
                _ => return Ok(()),
            },
            Tab::Azizah => match key.code {
                KeyCode::Home => self.azizah.scroll = 0,
                _ => return Ok(()),
            },
            Tab::Board => return self.handle_board_key(key),
        }
        if self.tab != Tab::Azizah {
            self.status = self.result_summary();
        }
        Ok(())
    }

    fn handle_items_key(&mut self, key: KeyEvent) -> Result<()> {
        let acquired = self.tracker.set();
        match key.code {
            KeyCode::Char('c') => self.items.cycle_category(acquired),
            KeyCode::Char('o') => {
                if !self.items.cycle_position(acquired) {
                    self.status = "보직 필터는 장비 종류를 선택했을 때만 쓸 수 있습니다".to_string();
                    return Ok(());
                }
            }
            KeyCode::Char('r') => self.items.cycle_region(acquired),
            KeyCode::Char('g') => self.items.cycle_group(acquired),
            KeyCode::Char('m') => self.items.cycle_protagonist(acquired),
            KeyCode::Char('a') => self.items.cycle_acquired(acquired),
            KeyCode::Char('x') => self.items.clear_filters(acquired),
            KeyCode::Char(' ') => return self.toggle_acquired(),
            KeyCode::Left => self.change_page(false),
            KeyCode::Right => self.change_page(true),
            KeyCode::Home => {
                self.items.go_to_page(1);
            }
            KeyCode::End => {
                let last = self
                    .items
                    .view
                    .as_ref()
                    .map_or(1, |view| view.page_view().total_pages);
                self.items.go_to_page(last);
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_acquired(&mut self) -> Result<()> {
        let Some(catalog) = self.items.catalog.clone() else {
            return Ok(());
        };
        let Some((key, name)) = self
            .items
            .selected()
            .map(|item| (item.key.clone(), item.display_name().to_string()))
        else {
            return Ok(());
        };
        let acquired = self.tracker.toggle(&catalog, &key)?;
        self.items.refilter(self.tracker.set());
        let progress = self.tracker.progress(&catalog);
        self.status = format!(
            "{name} {} · 진행도 {}/{} ({}%)",
            if acquired { "획득" } else { "획득 취소" },
            progress.acquired,
            progress.total,
            progress.percent
        );
        Ok(())
    }

    fn handle_routes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.routes.cycle_region(),
            KeyCode::Char('c') => self.routes.cycle_city(),
            KeyCode::Char('t') => self.routes.cycle_kind(),
            KeyCode::Char('m') => self.routes.cycle_commodity(),
            KeyCode::Char('x') => self.routes.clear_filters(),
            KeyCode::Left | KeyCode::Char('h') => self.routes.scroll_nations(-1),
            KeyCode::Right | KeyCode::Char('l') => self.routes.scroll_nations(1),
            _ => {}
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('w') => {
                self.board_tab.form = Some(PostForm::new(self.board_tab.author.value()));
            }
            KeyCode::Char('e') => {
                let acting = self.board_tab.author.value();
                match self.board_tab.selected(&self.board) {
                    Some(post) if self.board.can_modify(post, acting) => {
                        let form = PostForm::edit(post);
                        self.board_tab.form = Some(form);
                    }
                    Some(_) => self.status = "작성자 본인만 수정할 수 있습니다".to_string(),
                    None => {}
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                let acting = self.board_tab.author.value();
                match self.board_tab.selected(&self.board) {
                    Some(post) if self.board.can_modify(post, acting) => {
                        let id = post.id;
                        self.board_tab.confirm_delete = Some(id);
                    }
                    Some(_) => self.status = "작성자 본인만 삭제할 수 있습니다".to_string(),
                    None => {}
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.board_tab.selected(&self.board).map(|post| post.id) {
                    self.board.record_view(id)?;
                }
            }
            KeyCode::Char('s') => {
                self.board_tab.cycle_sort();
                self.status = format!("정렬: {}", self.board_tab.sort.label());
            }
            KeyCode::Char('u') => {
                self.prompt = self.board_tab.author.clone();
                self.mode = Mode::Author;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.board_tab.form.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.board_tab.form = None;
                self.status = "작성을 취소했습니다".to_string();
            }
            KeyCode::Tab | KeyCode::Down => form.cycle_focus(true),
            KeyCode::BackTab | KeyCode::Up => form.cycle_focus(false),
            KeyCode::Enter => self.submit_form(),
            _ => {
                edit_input(form.focused_mut(), key);
            }
        }
        Ok(())
    }

    fn submit_form(&mut self) {
        let Some(form) = self.board_tab.form.as_ref() else {
            return;
        };
        let draft = form.draft();
        let editing = form.editing;
        let acting = self.board_tab.author.value().to_string();
        let result = match editing {
            Some(id) => self.board.update_post(id, &acting, &draft).map(|post| post.id),
            None => self.board.add_post(&draft).map(|post| post.id),
        };
        match result {
            Ok(id) => {
                self.board_tab.form = None;
                if self.board_tab.author.is_empty() {
                    self.board_tab.author = TextInput::with_value(draft.author.trim());
                }
                self.board_tab.clamp(&self.board);
                self.status = match editing {
                    Some(_) => format!("게시글 #{id} 을(를) 수정했습니다"),
                    None => format!("게시글 #{id} 을(를) 등록했습니다"),
                };
            }
            Err(err) => {
                warn!(%err, "board post rejected");
                self.status = format!("저장하지 못했습니다: {err}");
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(id) = self.board_tab.confirm_delete.take() else {
            return Ok(());
        };
        if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            self.status = "삭제를 취소했습니다".to_string();
            return Ok(());
        }
        let acting = self.board_tab.author.value().to_string();
        let removed = self.board.delete_post(id, &acting)?;
        self.board_tab.clamp(&self.board);
        self.status = format!("게시글 \"{}\" 을(를) 삭제했습니다", removed.title);
        Ok(())
    }

    fn current_term(&self) -> Option<String> {
        let term = match self.tab {
            Tab::Items => self.items.criteria.term(),
            Tab::Routes => &self.routes.criteria.term,
            Tab::Crew => &self.crew.criteria.term,
            Tab::Board => &self.board_tab.term,
            Tab::Azizah => return None,
        };
        Some(term.raw().to_string())
    }

    fn apply_term(&mut self, term: &str) {
        match self.tab {
            Tab::Items => self.items.set_term(term, self.tracker.set()),
            Tab::Routes => self.routes.set_term(term),
            Tab::Crew => self.crew.set_term(term),
            Tab::Board => self.board_tab.set_term(term),
            Tab::Azizah => {}
        }
    }

    fn begin_search(&mut self) {
        let Some(term) = self.current_term() else {
            self.status = "이 탭에는 검색이 없습니다".to_string();
            return;
        };
        self.prompt = TextInput::with_value(&term);
        self.term_backup = term;
        self.mode = Mode::Search;
    }

    fn clear_term(&mut self) {
        if self.current_term().is_some_and(|term| !term.is_empty()) {
            self.apply_term("");
            self.status = self.result_summary();
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                let backup = std::mem::take(&mut self.term_backup);
                self.apply_term(&backup);
                self.mode = Mode::Browse;
                self.status = self.result_summary();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                self.status = self.result_summary();
            }
            _ => {
                if edit_input(&mut self.prompt, key) {
                    let term = self.prompt.value().to_string();
                    self.apply_term(&term);
                }
            }
        }
    }

    fn handle_author_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                let name = self.prompt.value().trim().to_string();
                self.board_tab.author = TextInput::with_value(&name);
                self.mode = Mode::Browse;
                self.status = if name.is_empty() {
                    "작성자 이름을 지웠습니다".to_string()
                } else {
                    format!("작성자: {name}")
                };
            }
            _ => {
                edit_input(&mut self.prompt, key);
            }
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.tab {
            Tab::Items => self.items.move_cursor(delta),
            Tab::Routes => self.routes.move_cursor(delta),
            Tab::Crew => self.crew.move_cursor(delta),
            Tab::Azizah => self.azizah.scroll_by(delta as i32),
            Tab::Board => self.board_tab.move_cursor(delta, &self.board),
        }
    }

    fn change_page(&mut self, forward: bool) {
        let moved = match self.tab {
            Tab::Items => self.items.change_page(forward),
            Tab::Routes => self.routes.change_page(forward),
            Tab::Crew => self.crew.change_page(forward),
            Tab::Azizah => {
                self.azizah.scroll_by(if forward { 10 } else { -10 });
                true
            }
            Tab::Board => false,
        };
        if !moved {
            debug!(forward, tab = ?self.tab, "no page to move to");
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(frame.size());

        let titles: Vec<String> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(idx, tab)| format!("{} {}", idx + 1, tab.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("대항해시대 4 도감"),
            )
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        match self.tab {
            Tab::Items => {
                let progress = self
                    .items
                    .catalog
                    .as_ref()
                    .map(|catalog| self.tracker.progress(catalog));
                render::render_items(
                    frame,
                    chunks[1],
                    &self.items,
                    self.tracker.set(),
                    progress,
                    &self.theme,
                );
            }
            Tab::Routes => render::render_routes(
                frame,
                chunks[1],
                &self.routes,
                self.config.high_value_threshold,
                &self.theme,
            ),
            Tab::Crew => render::render_crew(frame, chunks[1], &self.crew, &self.theme),
            Tab::Azizah => render::render_azizah(frame, chunks[1], &self.azizah, &self.theme),
            Tab::Board => {
                render::render_board(frame, chunks[1], &self.board_tab, &self.board, &self.theme)
            }
        }

        match self.mode {
            Mode::Search => {
                render::render_prompt(frame, chunks[2], "검색", &self.prompt, &self.theme)
            }
            Mode::Author => {
                render::render_prompt(frame, chunks[2], "작성자", &self.prompt, &self.theme)
            }
            Mode::Browse => self.render_status(frame, chunks[2]),
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let keys = match self.tab {
            Tab::Items => {
                "/ 검색  c 종류  o 보직  r 지역  g 캐릭터  m 주인공  a 획득  Space 획득 표시  x 초기화"
            }
            Tab::Routes => "/ 검색  r 지역  c 도시  t 종류  m 상품  x 초기화  h/l 국가 이동",
            Tab::Crew => "/ 검색  m 주인공  x 초기화",
            Tab::Azizah => "j/k 스크롤  n/p 한 화면",
            Tab::Board => "/ 검색  w 글쓰기  e 수정  d 삭제  s 정렬  u 작성자  Enter 조회  Ctrl+D 개발자 모드",
        };
        let lines = vec![
            Line::from(Span::raw(self.status.clone())),
            Line::from(vec![
                Span::styled(keys, Style::default().fg(self.theme.muted)),
                Span::styled(
                    "  n/p 페이지  Tab 탭  Ctrl+R 새로고침  q 종료",
                    Style::default().fg(self.theme.muted),
                ),
            ]),
        ];
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("상태"));
        frame.render_widget(paragraph, area);
    }
}

fn load_failed(status: &mut LoadStatus, dataset: &str, err: &LoadError) -> String {
    error!(%err, dataset, "dataset load failed");
    *status = LoadStatus::Failed(err.to_string());
    format!("{dataset} 을(를) 불러오지 못했습니다: {err}")
}

/// Apply an editing key to `input`; returns whether the text changed.
fn edit_input(input: &mut TextInput, key: KeyEvent) -> bool {
    let before_len = input.value().len();
    match key.code {
        KeyCode::Left => input.move_cursor(-1),
        KeyCode::Right => input.move_cursor(1),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Backspace => {
            input.backspace();
            return input.value().len() != before_len;
        }
        KeyCode::Delete => {
            input.delete();
            return input.value().len() != before_len;
        }
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            input.insert(ch);
            return input.value().len() != before_len;
        }
        _ => {}
    }
    false
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::{DataSource, KeyValueStore, LoadOptions, MemoryStore};

    fn app() -> AlmanacApp {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let loader = DatasetLoader::new(DataSource::parse("db"), LoadOptions::default());
        AlmanacApp::new(
            AppConfig::default(),
            loader,
            AcquiredTracker::load(Arc::clone(&store)),
            BoardManager::load(store),
        )
    }

    fn press(app: &mut AlmanacApp, code: KeyCode) {
        press_with(app, code, KeyModifiers::NONE);
    }

    fn press_with(app: &mut AlmanacApp, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_input(Event::Key(KeyEvent::new(code, modifiers)))
            .expect("key handled");
    }

    fn type_text(app: &mut AlmanacApp, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn write_post(app: &mut AlmanacApp, title: &str, content: &str) {
        press(app, KeyCode::Char('w'));
        type_text(app, title);
        press(app, KeyCode::Tab);
        press(app, KeyCode::Tab);
        type_text(app, content);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn writes_and_deletes_own_post() {
        let mut app = app();
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.tab, Tab::Board);

        press(&mut app, KeyCode::Char('u'));
        type_text(&mut app, "릴");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board_tab.author.value(), "릴");

        write_post(&mut app, "항해 일지", "리스본 출항");
        assert!(app.board_tab.form.is_none());
        assert_eq!(app.board.posts().len(), 1);
        assert_eq!(app.board.posts()[0].author, "릴");

        press(&mut app, KeyCode::Char('d'));
        assert!(app.board_tab.confirm_delete.is_some());
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.board.posts().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.board.posts().is_empty());
    }

    #[test]
    fn other_authors_need_developer_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('u'));
        type_text(&mut app, "티아");
        press(&mut app, KeyCode::Enter);
        write_post(&mut app, "보급", "식량 부족");

        press(&mut app, KeyCode::Char('u'));
        for _ in 0..2 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "라파엘");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('e'));
        assert!(app.board_tab.form.is_none());
        press(&mut app, KeyCode::Char('d'));
        assert!(app.board_tab.confirm_delete.is_none());

        press_with(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert!(app.board.developer_mode());
        press(&mut app, KeyCode::Char('d'));
        assert!(app.board_tab.confirm_delete.is_some());
    }

    #[test]
    fn empty_form_stays_open() {
        let mut app = app();
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Enter);
        assert!(app.board_tab.form.is_some());
        assert!(app.board.posts().is_empty());
        press(&mut app, KeyCode::Esc);
        assert!(app.board_tab.form.is_none());
    }

    #[test]
    fn search_prompt_filters_live_and_escape_restores() {
        let mut app = app();
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char('u'));
        type_text(&mut app, "릴");
        press(&mut app, KeyCode::Enter);
        write_post(&mut app, "후추 시세", "캘리컷");
        write_post(&mut app, "해적 출몰", "카리브");

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "후추");
        assert_eq!(app.board_tab.visible(&app.board).len(), 1);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.board_tab.term.is_empty());
        assert_eq!(app.board_tab.visible(&app.board).len(), 2);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "해적");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board_tab.term.raw(), "해적");
        press(&mut app, KeyCode::Esc);
        assert!(app.board_tab.term.is_empty());
    }

    #[test]
    fn tabs_cycle_and_azizah_has_no_search() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Routes);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.tab, Tab::Board);
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Browse);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
