use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use flexi_logger::{Logger, LoggerHandle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;
use upnext_cli::cli::{Cli, Command, ThemeCommand, collect_config_overrides};
use upnext_cli::render;
use upnext_cli::session::{Session, pomodoro_secs};
use upnext_core::config::{
    Config, ConfigLoad, ConfigOverrides, canonical_log_level, load_config_with_fallback,
    merge_overrides,
};
use upnext_core::date_cursor::format_day;
use upnext_core::pomodoro::format_clock;
use upnext_core::model::theme::Palette;
use upnext_core::notify::{Notice, Notifier, notifier_from_env};
use upnext_core::{Achievement, AppError, FileKeyValueStore, PomodoroTimer, Tick};

const LOG_ENV_VAR: &str = "UPNEXT_LOG";
const DEFAULT_LOG_LEVEL: &str = "warn";

type FileSession = Session<FileKeyValueStore>;

fn init_logging(config: &Config) -> Option<LoggerHandle> {
    let level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|raw| canonical_log_level(&raw))
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    match Logger::try_with_str(&level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("WARN: logging disabled: {err}");
            None
        }
    }
}

fn report_config_error(load: &ConfigLoad) {
    if let Some(err) = load.error.as_ref() {
        log::warn!(
            "event=config_fallback module=cli code={} reason={}",
            err.code(),
            err.message()
        );
    }
}

fn palette_for(session: &FileSession, cli: &Cli, overrides: &ConfigOverrides) -> Palette {
    let colour_disabled =
        cli.json || std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal();
    if colour_disabled {
        Palette::plain()
    } else {
        session.theme(overrides).palette()
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{value}");
}

fn announce_achievements(achievements: &[Achievement], json: bool) {
    if achievements.is_empty() {
        return;
    }

    if !json {
        for achievement in achievements {
            println!("Achievement unlocked: {}", achievement.name);
        }
    }

    match notifier_from_env() {
        Ok(notifier) => {
            for achievement in achievements {
                send_notice(notifier.as_ref(), &Notice::achievement_unlocked(achievement));
            }
        }
        Err(err) => log::warn!("event=notifier_unavailable module=cli reason={}", err.message()),
    }
}

fn send_notice(notifier: &dyn Notifier, notice: &Notice) {
    if let Err(err) = notifier.notify(notice) {
        log::warn!("event=notify_failed module=cli reason={}", err.message());
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn print_viewed_day(session: &FileSession, json: bool) {
    let day = session.viewed_day();
    if json {
        print_json(&serde_json::json!({
            "date": format_day(day),
            "today": session.cursor.is_today(),
        }));
    } else {
        println!("Viewing: {}", render::day_label(day));
    }
}

fn run_pomodoro(duration_secs: u32, json: bool) -> Result<(), AppError> {
    let mut timer = PomodoroTimer::new(duration_secs);
    let show_clock = !json && io::stdout().is_terminal();
    let mut stdout = io::stdout();
    timer.start();
    log::info!(
        "event=pomodoro_started module=cli duration_secs={}",
        timer.duration()
    );

    if show_clock {
        print!("\r{}", timer.clock());
        stdout.flush()?;
    }

    loop {
        std::thread::sleep(Duration::from_secs(1));
        match timer.tick() {
            Tick::Running(_) => {
                if show_clock {
                    print!("\r{}", timer.clock());
                    stdout.flush()?;
                }
            }
            Tick::Finished | Tick::Idle => break,
        }
    }

    if show_clock {
        println!();
    }
    if json {
        print_json(&serde_json::json!({
            "status": "finished",
            "duration_secs": timer.duration(),
        }));
    } else {
        println!("Pomodoro finished ({} focused)", format_clock(timer.duration()));
    }

    let minutes = timer.duration().div_ceil(60);
    match notifier_from_env() {
        Ok(notifier) => send_notice(notifier.as_ref(), &Notice::pomodoro_finished(minutes)),
        Err(err) => log::warn!("event=notifier_unavailable module=cli reason={}", err.message()),
    }

    Ok(())
}

fn run_command(cli: Cli, session: &mut FileSession) -> Result<(), AppError> {
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let config = session.effective_config(&overrides);
    session.apply_day_flags(cli.date.as_deref(), cli.offset)?;
    let palette = palette_for(session, &cli, &overrides);
    let day = session.viewed_day();

    match cli.command {
        Command::Add { ref input } => {
            let raw = input.join(" ");
            let added = session
                .store
                .add_task(&raw, day)
                .ok_or_else(|| AppError::invalid_input("text is required"))?;
            session.check_persisted()?;

            if cli.json {
                print_json(&render::task_json(&added.task));
            } else {
                println!("Added task: {} ({})", added.task.text, added.task.id);
                if !added.task.tags.is_empty() {
                    println!("Tags: {}", render::format_tags(&added.task.tags));
                }
            }
            announce_achievements(&added.newly_earned, cli.json);
        }
        Command::Toggle { ref id } => {
            let outcome = session
                .store
                .toggle_task(id.trim())
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            session.check_persisted()?;

            if cli.json {
                print_json(&serde_json::json!({
                    "task": render::task_json(&outcome.task),
                    "completed": outcome.completed,
                    "streak": outcome.streak.value(),
                    "achievements": render::achievement_ids(&outcome.newly_earned),
                }));
            } else {
                let verb = if outcome.completed { "Completed" } else { "Reopened" };
                println!("{verb} task: {} ({})", outcome.task.text, outcome.task.id);
                if outcome.completed {
                    println!("{}", palette.accentize("Nice work!"));
                }
                println!("{}", render::streak_label(outcome.streak.value()));
            }
            announce_achievements(&outcome.newly_earned, cli.json);
        }
        Command::Delete { ref id } => {
            let removed = session
                .store
                .delete_task(id.trim())
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            session.check_persisted()?;

            if cli.json {
                print_json(&render::task_json(&removed));
            } else {
                println!("Deleted task: {} ({})", removed.text, removed.id);
            }
        }
        Command::Move { from, to, day_view } => {
            let moved = if day_view {
                session.store.reorder_day_view(day, from, to)
            } else {
                session.store.reorder_task(from, to)
            };
            if !moved {
                return Err(AppError::invalid_input("position out of range"));
            }
            session.check_persisted()?;

            if cli.json {
                print_json(&serde_json::json!({
                    "from": from,
                    "to": to,
                    "scope": if day_view { "day" } else { "all" },
                }));
            } else {
                println!("Moved task from {from} to {to}");
            }
        }
        Command::List => {
            let listing = session.listing();
            if cli.json {
                print_json(&render::day_json(&listing));
            } else {
                println!("{}", render::render_day(&listing, &palette));
            }
        }
        Command::Stats => {
            let streak = session.store.streak().value();
            let remaining = session.store.count_remaining(day);
            let completed = session.store.count_completed(day);
            let earned = session.store.earned_achievements().len();
            if cli.json {
                print_json(&serde_json::json!({
                    "date": format_day(day),
                    "streak": streak,
                    "remaining": remaining,
                    "completed": completed,
                    "total_tasks": session.store.tasks().len(),
                    "achievements_earned": earned,
                }));
            } else {
                println!("{}", palette.accentize(&render::day_label(day)));
                println!("{}", render::streak_label(streak));
                println!("Remaining: {remaining}  Completed: {completed}");
                println!("Achievements: {earned}/{}", Achievement::all().len());
            }
        }
        Command::Next => {
            session.cursor.shift(1);
            print_viewed_day(session, cli.json);
        }
        Command::Prev => {
            session.cursor.shift(-1);
            print_viewed_day(session, cli.json);
        }
        Command::Today => {
            session.cursor.reset_to_today();
            print_viewed_day(session, cli.json);
        }
        Command::Theme { ref theme } => {
            let active = match theme {
                ThemeCommand::Show => session.theme(&overrides),
                ThemeCommand::List => {
                    let active = session.theme(&overrides);
                    if cli.json {
                        let names: Vec<&str> =
                            upnext_core::Theme::all().iter().map(|t| t.name).collect();
                        print_json(&serde_json::json!({
                            "active": active.name,
                            "themes": names,
                        }));
                    } else {
                        println!("{}", render::render_theme_list(&active, &palette));
                    }
                    return Ok(());
                }
                ThemeCommand::Set { name } => session.preferences.set_theme(name)?,
                ThemeCommand::Toggle => session.preferences.toggle_theme()?,
            };

            if cli.json {
                print_json(&serde_json::json!({ "theme": active.name }));
            } else {
                println!("Theme: {}", active.palette().accentize(active.name));
            }
        }
        Command::Achievements => {
            let earned = session.store.earned_achievements();
            if cli.json {
                print_json(&render::achievements_json(earned));
            } else {
                println!("{}", render::render_achievements(earned));
            }
        }
        Command::Pomodoro { minutes, seconds } => {
            if minutes == Some(0) {
                return Err(AppError::invalid_input("minutes must be positive"));
            }
            run_pomodoro(pomodoro_secs(&config, minutes, seconds), cli.json)?;
        }
    }

    Ok(())
}

fn open_session(config: Config) -> Result<FileSession, AppError> {
    let backend = FileKeyValueStore::from_env()?;
    log::debug!(
        "event=store_path module=cli path={}",
        backend.path().display()
    );
    Ok(Session::open(backend, config))
}

fn run_interactive(session: &mut FileSession) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("upnext".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                    println!("{err}");
                } else {
                    eprintln!("ERROR: {}", normalize_parse_error(err));
                }
                continue;
            }
        };

        if let Err(err) = run_command(cli, session) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    let interactive = args.next().is_none();

    let cli = if interactive {
        None
    } else {
        match Cli::try_parse() {
            Ok(cli) => Some(cli),
            Err(err) => {
                if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                    err.exit();
                }
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
        }
    };

    let load = load_config_with_fallback();
    let logging_config = match cli.as_ref() {
        Some(cli) => collect_config_overrides(&cli.config_override)
            .map(|overrides| merge_overrides(&load.config, &overrides))
            .unwrap_or_else(|_| load.config.clone()),
        None => load.config.clone(),
    };
    let _logger = init_logging(&logging_config);
    report_config_error(&load);

    let mut session = match open_session(load.config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let result = match cli {
        Some(cli) => run_command(cli, &mut session),
        None => run_interactive(&mut session),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
