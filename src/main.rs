use clap::Parser;
use dialoguer::{Confirm, Select};
use indicatif::ProgressBar;
use std::future::Future;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vastu_ai::app::{App, AppState};
use vastu_ai::cli::{fill_missing, Cli, Commands};
use vastu_ai::config::Config;
use vastu_ai::error::{Result, VastuError};
use vastu_ai::export::{self, pdf::PdfOptions};
use vastu_ai::gemini::GeminiClient;
use vastu_ai::render;
use vastu_ai::session::FileStore;
use vastu_common::i18n::{t, t_with};
use vastu_common::{EntranceDirection, Language, PropertyType};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            let language = cli.lang.unwrap_or(Language::BASE);
            render::print_error(&render::error_text(&e, language), language);
            std::process::exit(1);
        }
    };
    let language = config.resolve_language(cli.lang);

    match run(cli, config, language).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::debug!(error = %e.detail(), "command failed");
            render::print_error(&render::error_text(&e, language), language);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "vastu_ai=debug,vastu_common=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 成功なら true、解析がエラー状態で終わった場合は false
async fn run(cli: Cli, mut config: Config, language: Language) -> Result<bool> {
    let command = match cli.command {
        Commands::Config { set_api_key, set_model, set_font, set_language, show } => {
            run_config(&mut config, set_api_key, set_model, set_font, set_language, show)?;
            return Ok(true);
        }
        other => other,
    };

    let session_dir = config.resolve_session_dir(cli.session_dir)?;
    tracing::debug!(dir = %session_dir.display(), "using session directory");
    let store = FileStore::new(session_dir);

    match command {
        Commands::Analyze { file, direction, property_type, pdf, no_retry } => {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            println!("{}", t_with(language, "form_upload_selected", &[("fileName", &file_name)]));

            let interactive = std::io::stdin().is_terminal();
            let direction = fill_missing(direction, "entrance direction", interactive, || prompt_direction(language))?;
            let property_type =
                fill_missing(property_type, "property type", interactive, || prompt_property_type(language))?;

            let client = GeminiClient::from_config(&config)?;
            let mut app = App::new(store, language);

            loop {
                // ファイル検証は submit_file 内でAPI呼び出しより前に行う
                let submission = app.submit_file(&client, &file, config.max_upload_bytes, direction, property_type);
                let state = with_spinner(t(language, "form_loading_title"), submission).await?;
                if state != AppState::Error {
                    break;
                }

                let message = app.error_message().unwrap_or_default().to_string();
                render::print_error(&message, language);
                if no_retry || app.error_is_user_fixable() || !confirm_retry(language)? {
                    return Ok(false);
                }
            }

            show_current(&app);
            if let Some(output) = pdf {
                export_current(&app, &config, &output)?;
            }
            Ok(true)
        }

        Commands::Show => {
            let mut app = App::restore(store, language);
            if !ensure_language(&mut app, &config).await? {
                return Ok(false);
            }
            show_current(&app);
            Ok(true)
        }

        Commands::Export { output } => {
            let mut app = App::restore(store, language);
            if !ensure_language(&mut app, &config).await? {
                return Ok(false);
            }
            let output = output.unwrap_or_else(|| PathBuf::from("."));
            export_current(&app, &config, &output)?;
            Ok(true)
        }

        Commands::Reset => {
            let mut app = App::restore(store, language);
            app.reset()?;
            println!("✔ {}", t(language, "session_reset"));
            Ok(true)
        }

        Commands::Config { .. } => Ok(true),
    }
}

fn run_config(
    config: &mut Config,
    set_api_key: Option<String>,
    set_model: Option<String>,
    set_font: Option<PathBuf>,
    set_language: Option<Language>,
    show: bool,
) -> Result<()> {
    if let Some(key) = set_api_key {
        config.set_api_key(key)?;
        println!("✔ API key saved");
    }

    if let Some(model) = set_model {
        config.model = model;
        config.save()?;
        println!("✔ Model set to {}", config.model);
    }

    if let Some(font) = set_font {
        if !font.is_file() {
            return Err(VastuError::FileNotFound(font.display().to_string()));
        }
        config.pdf_font = Some(font);
        config.save()?;
        println!("✔ PDF font saved");
    }

    if let Some(language) = set_language {
        config.default_language = language;
        config.save()?;
        println!("✔ Default language set to {}", language.english_name());
    }

    if show {
        println!("Settings ({}):", Config::config_path()?.display());
        println!("  model: {}", config.model);
        println!("  base url: {}", config.base_url);
        println!("  timeout: {}s", config.timeout_seconds);
        println!("  max upload: {} bytes", config.max_upload_bytes);
        println!("  default language: {}", config.default_language);
        println!(
            "  pdf font: {}",
            config
                .pdf_font
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in, English only)".into())
        );
        println!("  API key: {}", if config.get_api_key().is_ok() { "set" } else { "not set" });
    }

    Ok(())
}

/// 表示言語のレポートが無ければ翻訳を取得する
///
/// 翻訳に失敗した場合は false。
async fn ensure_language(app: &mut App<FileStore>, config: &Config) -> Result<bool> {
    let language = app.language();
    if app.state() == AppState::Result && !app.reports().contains(language) {
        let client = GeminiClient::from_config(config)?;
        if let Some(pending) = app.pending_translation() {
            let completion = with_spinner(t(language, "form_translating_title"), pending.run(&client)).await;
            app.complete(completion);
        }
    }

    if app.state() == AppState::Error {
        render::print_error(app.error_message().unwrap_or_default(), language);
        return Ok(false);
    }
    Ok(true)
}

fn show_current(app: &App<FileStore>) {
    match app.current_report() {
        Some(report) => render::print_report(report, app.last_request(), app.language()),
        None => println!("{}", t(app.language(), "session_empty")),
    }
}

fn export_current(app: &App<FileStore>, config: &Config, output: &Path) -> Result<()> {
    let language = app.language();
    let Some(report) = app.current_report() else {
        println!("{}", t(language, "session_empty"));
        return Ok(());
    };

    let now = chrono::Local::now();
    let path = export::output_path_for_report(output, language, now);
    let options = PdfOptions {
        font_path: config
            .pdf_font
            .clone()
            .or_else(|| export::font::find_system_font(language)),
        generated_at: Some(export::generated_at_text(now)),
    };

    let spinner = start_spinner(t(language, "result_button_downloading"));
    let result = export::pdf::generate_pdf(report, app.last_request(), language, &path, &options);
    spinner.finish_and_clear();
    result?;

    println!("✔ {}", render::pdf_saved_text(&path, language));
    Ok(())
}

fn prompt_direction(language: Language) -> Result<EntranceDirection> {
    let items: Vec<String> = EntranceDirection::ALL.iter().map(|d| t(language, d.i18n_key())).collect();
    let index = Select::new()
        .with_prompt(t(language, "form_direction_placeholder_select"))
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    Ok(EntranceDirection::ALL[index])
}

fn prompt_property_type(language: Language) -> Result<PropertyType> {
    let items: Vec<String> = PropertyType::ALL.iter().map(|p| t(language, p.i18n_key())).collect();
    let index = Select::new()
        .with_prompt(t(language, "form_property_placeholder"))
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    Ok(PropertyType::ALL[index])
}

fn confirm_retry(language: Language) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(t(language, "form_error_retry_prompt"))
        .default(true)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> VastuError {
    VastuError::Io(std::io::Error::other(e.to_string()))
}

fn start_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// loading 中はスピナーを表示
async fn with_spinner<F: Future>(message: String, fut: F) -> F::Output {
    let spinner = start_spinner(message);
    let output = fut.await;
    spinner.finish_and_clear();
    output
}
