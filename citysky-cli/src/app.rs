//! Interactive single-screen lookup: type a city, pick a suggestion, read the report.

use std::{
    collections::VecDeque,
    future::Future,
    io::{self, Stdout, Write},
    sync::Arc,
};

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use citysky_core::{Config, FetchError, Session, Units, WeatherProvider};

const STATUS_ROW: u16 = 2;

/// What the key handler asks the loop to do next.
#[derive(Debug, PartialEq, Eq)]
enum Intent {
    None,
    Quit,
    Fetch,
}

/// Selection cursor and the last notification; everything else lives in [`Session`].
#[derive(Debug, Default)]
struct ViewState {
    selected: Option<usize>,
    notice: Option<String>,
}

/// Restores the terminal even when the loop exits with an error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut Stdout) -> Result<Self> {
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

pub async fn run(config: &Config, provider: Arc<dyn WeatherProvider>) -> Result<()> {
    let (mut session, mut suggestions) = Session::new(provider, config.debounce());
    let mut loading = session.subscribe_loading();
    let mut view = ViewState::default();

    // crossterm's reader blocks, so it gets its own thread.
    let (key_tx, mut keys) = mpsc::channel(64);
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(evt) => {
                    if key_tx.blocking_send(Ok(evt)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = key_tx.blocking_send(Err(e));
                    break;
                }
            }
        }
    });

    let mut out = io::stdout();
    let _terminal = TerminalGuard::enter(&mut out)?;
    let mut backlog = VecDeque::new();

    loop {
        draw(&mut out, &session, &view, config.units)?;

        let key = match backlog.pop_front() {
            Some(key) => key,
            None => tokio::select! {
                Some(evt) = keys.recv() => match evt? {
                    Event::Key(key) => key,
                    _ => continue,
                },
                Some(update) = suggestions.recv() => {
                    session.apply_suggestions(update);
                    view.selected = view.selected.filter(|i| *i < session.suggestions().len());
                    continue;
                }
                else => break,
            },
        };

        match handle_key(key, &mut session, &mut view) {
            Intent::Quit => break,
            Intent::Fetch => {
                let target = fetch_target(view.selected.take(), session.suggestions());
                let waited = match &target {
                    FetchTarget::Suggestion(city) => {
                        let fetch = session.select_suggestion(city);
                        await_fetch(&mut out, &mut loading, &mut keys, &mut backlog, fetch).await?
                    }
                    FetchTarget::Query => {
                        let fetch = session.submit();
                        await_fetch(&mut out, &mut loading, &mut keys, &mut backlog, fetch).await?
                    }
                };

                match waited {
                    FetchWait::Settled(outcome) => {
                        view.notice = outcome.err().map(|err| notice_for(&err));
                    }
                    FetchWait::Quit => break,
                }
            }
            Intent::None => {}
        }
    }

    Ok(())
}

/// What Enter looks up: the highlighted suggestion, or the typed text when nothing is.
#[derive(Debug, PartialEq, Eq)]
enum FetchTarget {
    Suggestion(String),
    Query,
}

fn fetch_target(selected: Option<usize>, suggestions: &[String]) -> FetchTarget {
    selected
        .and_then(|i| suggestions.get(i))
        .map_or(FetchTarget::Query, |city| FetchTarget::Suggestion(city.clone()))
}

fn handle_key(key: KeyEvent, session: &mut Session, view: &mut ViewState) -> Intent {
    if key.kind != KeyEventKind::Press {
        return Intent::None;
    }

    match key.code {
        KeyCode::Esc if view.notice.is_some() => {
            view.notice = None;
            Intent::None
        }
        _ if is_quit(&key) => Intent::Quit,
        KeyCode::Enter => Intent::Fetch,
        KeyCode::Char(c) => {
            let mut text = session.query().to_string();
            text.push(c);
            edit(session, view, text);
            Intent::None
        }
        KeyCode::Backspace => {
            let mut text = session.query().to_string();
            text.pop();
            edit(session, view, text);
            Intent::None
        }
        KeyCode::Down => {
            let count = session.suggestions().len();
            if count > 0 {
                view.selected = Some(view.selected.map_or(0, |i| (i + 1).min(count - 1)));
            }
            Intent::None
        }
        KeyCode::Up => {
            view.selected = match view.selected {
                Some(0) | None => None,
                Some(i) => Some(i - 1),
            };
            Intent::None
        }
        _ => Intent::None,
    }
}

fn edit(session: &mut Session, view: &mut ViewState, text: String) {
    view.notice = None;
    view.selected = None;
    session.on_query_change(text);
}

/// How waiting on a weather fetch ended.
#[derive(Debug)]
enum FetchWait {
    Settled(Result<(), FetchError>),
    /// The user quit; the fetch future was dropped, which also lowers the loading flag.
    Quit,
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Await a fetch that borrows the session, painting the loading line as the flag moves.
///
/// Keys keep being read: a quit key abandons the fetch, anything else is queued in
/// `backlog` and replayed once the fetch settles.
async fn await_fetch<W, F>(
    out: &mut W,
    loading: &mut watch::Receiver<bool>,
    keys: &mut mpsc::Receiver<io::Result<Event>>,
    backlog: &mut VecDeque<KeyEvent>,
    fetch: F,
) -> io::Result<FetchWait>
where
    W: Write,
    F: Future<Output = Result<(), FetchError>>,
{
    tokio::pin!(fetch);

    loop {
        tokio::select! {
            outcome = &mut fetch => return Ok(FetchWait::Settled(outcome)),
            Ok(()) = loading.changed() => {
                let busy = *loading.borrow_and_update();
                debug!(busy, "loading flag changed");
                paint_status(out, busy)?;
            }
            Some(evt) = keys.recv() => {
                let Event::Key(key) = evt? else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_quit(&key) {
                    debug!("abandoning weather fetch");
                    return Ok(FetchWait::Quit);
                }
                backlog.push_back(key);
            }
        }
    }
}

fn notice_for(err: &FetchError) -> String {
    match err {
        FetchError::Network(cause) => format!("{err} ({cause:#})"),
        _ => err.to_string(),
    }
}

fn paint_status<W: Write>(out: &mut W, busy: bool) -> io::Result<()> {
    queue!(out, MoveTo(0, STATUS_ROW), Clear(ClearType::CurrentLine))?;
    if busy {
        queue!(out, Print("Loading..."))?;
    }
    out.flush()
}

fn draw(out: &mut Stdout, session: &Session, view: &ViewState, units: Units) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;

    let mut row = 0;
    let mut line = |out: &mut Stdout, text: &str| -> io::Result<()> {
        queue!(out, MoveTo(0, row), Print(text))?;
        row += 1;
        Ok(())
    };

    line(out, "Weather App   (Enter: get weather, Up/Down: pick suggestion, Esc: quit)")?;
    line(out, &format!("Enter City: {}_", session.query()))?;
    line(out, if session.is_loading() { "Loading..." } else { "" })?;

    if let Some(notice) = &view.notice {
        queue!(out, SetAttribute(Attribute::Bold))?;
        line(out, &format!("! {notice}"))?;
        queue!(out, SetAttribute(Attribute::Reset))?;
    }

    for (i, suggestion) in session.suggestions().iter().enumerate() {
        let marker = if view.selected == Some(i) { ">" } else { " " };
        line(out, &format!("{marker} {suggestion}"))?;
    }

    if let Some(weather) = session.weather() {
        line(out, "")?;
        let animation = session.animation();
        line(out, &format!("[{animation}] {}", animation.uri()))?;
        for text in weather.report(units).lines() {
            line(out, &text)?;
        }
    }

    out.flush()
}
