use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use conv_logging::conv_info;
use omniconv_core::{update, Effect, Msg, Phase, SessionState};
use omniconv_engine::{ChannelMode, EngineConfig, EngineEvent, EngineHandle};

use super::effects::{session_msg, EffectRunner};
use super::logging::{self, LogDestination};
use super::persistence;
use super::ui;

// Cooperative loop cadence; engine events and stdin lines are drained each
// tick and renders coalesce behind the dirty flag.
const TICK: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);

    let store_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let download_dir = store_dir.join("downloads");

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let engine = EngineHandle::new(engine_config(download_dir));
    let runner = EffectRunner::new(engine, msg_tx);
    let line_rx = spawn_stdin_reader();

    let mut app = App {
        state: SessionState::new(),
        theme: persistence::load_theme(&store_dir),
        chat_response_id: None,
        runner,
        store_dir,
        quit: false,
    };

    let restored = persistence::load_history(&app.store_dir);
    if !restored.is_empty() {
        app.dispatch(Msg::HistoryRestored(restored));
    }
    app.state.consume_dirty();

    print_lines(&ui::render::help());
    print_lines(&ui::render::render(&app.state.view(), &app.theme));

    while !app.quit {
        for event in app.runner.poll_events() {
            app.handle_engine_event(event);
        }
        while let Ok(msg) = msg_rx.try_recv() {
            app.dispatch(msg);
        }
        loop {
            match line_rx.try_recv() {
                Ok(line) => app.handle_line(&line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    app.quit = true;
                    break;
                }
            }
        }
        if app.state.consume_dirty() {
            print_lines(&ui::render::render(&app.state.view(), &app.theme));
        }
        thread::sleep(TICK);
    }

    conv_info!("omniconv exiting");
    Ok(())
}

fn engine_config(download_dir: PathBuf) -> EngineConfig {
    let mut config = EngineConfig::default_with_download_dir(download_dir);
    if let Ok(base_url) = std::env::var("OMNICONV_API") {
        config.api.base_url = base_url;
    }
    // A configured push channel supersedes polling entirely.
    if let Ok(ws_url) = std::env::var("OMNICONV_PUSH_URL") {
        config.channel = ChannelMode::Push { ws_url };
    }
    config
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(text) => {
                    if tx.send(text).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    });
    rx
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

struct App {
    state: SessionState,
    theme: String,
    chat_response_id: Option<String>,
    runner: EffectRunner,
    store_dir: PathBuf,
    quit: bool,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            match effect {
                Effect::PersistHistory => {
                    persistence::save_history(&self.store_dir, self.state.history());
                }
                other => self.runner.run(other),
            }
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        if let Some(msg) = session_msg(&event) {
            self.dispatch(msg);
            return;
        }
        match event {
            EngineEvent::ChatReply(Ok(reply)) => {
                if let Some(id) = reply.response_id {
                    self.chat_response_id = Some(id);
                }
                let text = reply
                    .response
                    .unwrap_or_else(|| "No response text.".to_string());
                println!("assistant: {text}");
            }
            EngineEvent::ChatReply(Err(err)) => println!("assistant error: {err}"),
            EngineEvent::DownloadFinished(Ok(path)) => println!("Saved to {}", path.display()),
            EngineEvent::DownloadFinished(Err(err)) => println!("Download failed: {err}"),
            _ => {}
        }
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "open" => self.open_file(rest),
            "url" => self.dispatch(Msg::UrlSubmitted(rest.to_string())),
            "pick" => self.dispatch(Msg::FormatSelected(rest.to_string())),
            "preset" => self.dispatch(Msg::PresetChanged(rest.to_string())),
            "engine" => self.dispatch(Msg::OcrEngineChanged(rest.to_string())),
            "ocr-theme" => self.dispatch(Msg::OcrThemeChanged(rest.to_string())),
            "limit" => self.set_limit(rest),
            "ai" => match rest {
                "on" => self.dispatch(Msg::AiToggled(true)),
                "off" => self.dispatch(Msg::AiToggled(false)),
                _ => println!("Usage: ai on|off"),
            },
            "start" => self.dispatch(Msg::OptionsConfirmed),
            "download" => self.download(),
            "chat" => {
                if rest.is_empty() {
                    println!("Usage: chat <message>");
                } else {
                    self.runner
                        .chat(rest.to_string(), self.chat_response_id.clone());
                }
            }
            "history" => print_lines(&ui::render::render_history(self.state.history())),
            "theme" => self.toggle_theme(),
            "reset" => self.dispatch(Msg::ResetRequested),
            "help" => print_lines(&ui::render::help()),
            "quit" | "exit" => self.quit = true,
            _ => println!("Unknown command; `help` lists them."),
        }
    }

    fn open_file(&mut self, raw: &str) {
        if raw.is_empty() {
            println!("Usage: open <path>");
            return;
        }
        match std::fs::metadata(raw) {
            Ok(meta) if meta.is_file() => self.dispatch(Msg::FilePicked {
                path: raw.to_string(),
                size_bytes: meta.len(),
            }),
            Ok(_) => println!("{raw} is not a file."),
            Err(err) => println!("Cannot read {raw}: {err}"),
        }
    }

    fn set_limit(&mut self, raw: &str) {
        match raw {
            "on" => self.dispatch(Msg::LengthLimitToggled(true)),
            "off" => self.dispatch(Msg::LengthLimitToggled(false)),
            value => match value.parse::<u32>() {
                Ok(px) => self.dispatch(Msg::LengthLimitChanged(px)),
                Err(_) => println!("Usage: limit on|off|<px>"),
            },
        }
    }

    fn download(&mut self) {
        if self.state.phase() != Phase::Done {
            println!("Nothing to download yet.");
            return;
        }
        let filename = self.state.view().output_filename;
        match (self.state.job_id(), filename) {
            (Some(job_id), Some(filename)) => {
                println!("Downloading {filename}...");
                self.runner.download(job_id.to_string(), filename);
            }
            _ => println!("Nothing to download yet."),
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = if self.theme == "dark" {
            "light".to_string()
        } else {
            "dark".to_string()
        };
        persistence::save_theme(&self.store_dir, &self.theme);
        println!("Theme preference: {}", self.theme);
    }
}
