use clap::ArgMatches;
use clap_complete::Shell;
use tracing::error;

use popline_core::config::PoplineConfig;
use popline_core::delivery::{DeliveryError, PopupHost};
use popline_core::placement::{
    PlacementEngine, PlacementStrategy, PopupSize, Position, SystemMonitors,
};
use popline_core::platform::{CapabilityResolver, PlatformInfo};
use popline_core::{MultiplexerAdapter, NativeBridge, PasteOrchestrator, TerminalContext};

use crate::app::build_cli;

pub async fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("capabilities", sub_matches)) => handle_capabilities_command(sub_matches).await,
        Some(("detect", sub_matches)) => handle_detect_command(sub_matches).await,
        Some(("position", sub_matches)) => handle_position_command(sub_matches).await,
        Some(("paste", sub_matches)) => handle_paste_command(sub_matches).await,
        Some(("completions", sub_matches)) => handle_completions_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

async fn handle_capabilities_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut resolver = CapabilityResolver::new();
    let mut multiplexer = MultiplexerAdapter::new();
    let info = resolver.resolve(&mut multiplexer).await;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_platform_info(&info);
    }

    Ok(())
}

fn print_platform_info(info: &PlatformInfo) {
    let flag = |value: bool| if value { "yes" } else { "no" };
    let caps = &info.capabilities;

    println!("Platform: {} ({})", info.platform_name, info.platform);
    println!("  window detection:          {}", flag(caps.native_window_detection));
    println!("  keystroke injection:       {}", flag(caps.native_keystroke_injection));
    println!("  text field detection:      {}", flag(caps.native_text_field_detection));
    println!("  clipboard integration:     {}", flag(caps.clipboard_integration));
    println!("  app activation:            {}", flag(caps.app_activation));
    println!(
        "  special terminal handling: {}",
        flag(caps.requires_special_terminal_handling)
    );
    if let Some(environment) = &info.special_environment {
        println!("Special environment: {}", environment);
    }
    println!("Resolved at: {}", info.resolved_at.to_rfc3339());
}

async fn handle_detect_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let mut multiplexer = MultiplexerAdapter::new();
    let context = multiplexer.detect().await;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        print_terminal_context(&context);
    }

    Ok(())
}

fn print_terminal_context(context: &TerminalContext) {
    if !context.is_multiplexer_environment {
        println!("Multiplexer environment: no");
        return;
    }

    println!("Multiplexer environment: yes");
    let field = |label: &str, value: &Option<String>| {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    };
    field("guest distribution", &context.guest_distribution);
    field("guest kernel", &context.guest_kernel);
    field("working directory", &context.working_directory);
    field("window title", &context.window_title);
    if let Some(pid) = context.terminal_pid {
        println!("  terminal pid: {}", pid);
    }
    field("host profile path", &context.host_profile_path);
}

async fn handle_position_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = PoplineConfig::load_hierarchy()?;

    let strategy = match matches.get_one::<String>("strategy") {
        Some(value) => value.parse::<PlacementStrategy>()?,
        None => config.window.position,
    };
    let size = PopupSize {
        width: *matches.get_one::<u32>("width").unwrap_or(&config.window.width),
        height: *matches
            .get_one::<u32>("height")
            .unwrap_or(&config.window.height),
    };

    let bridge = NativeBridge::new(&config.bridge);
    let monitors = SystemMonitors;
    let mut resolver = CapabilityResolver::new();
    let mut multiplexer = MultiplexerAdapter::new();
    let info = resolver.resolve(&mut multiplexer).await;

    let engine = PlacementEngine::new(&bridge, &monitors, info.platform, info.capabilities);
    let position = engine
        .compute_position(strategy, size)
        .await
        .map_err(|e| format!("Failed to compute position: {}", e))?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&position)?);
    } else {
        println!("{} {}", position.x, position.y);
    }

    Ok(())
}

async fn handle_paste_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let text = matches
        .get_one::<String>("text")
        .ok_or("Text argument is required")?;

    let config = PoplineConfig::load_hierarchy()?;
    let bridge = NativeBridge::new(&config.bridge);

    let mut orchestrator =
        PasteOrchestrator::new(bridge, SystemMonitors, HeadlessHost::default(), &config);

    // The headless host stands in for the popup window: the show cycle
    // still captures the previous app and space signature.
    orchestrator.show().await?;
    let report = orchestrator.submit(text).await;
    orchestrator.hide();

    match report.progress.furthest() {
        Some(step) => println!("Delivered via {} path (furthest step: {})", report.path, step),
        None => println!("Delivery failed via {} path", report.path),
    }

    if !report.delivered() {
        return Err("paste delivery failed: clipboard could not be set".into());
    }

    Ok(())
}

fn handle_completions_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let shell = matches
        .get_one::<Shell>("shell")
        .ok_or("Shell argument is required")?;

    let mut cmd = build_cli();
    clap_complete::generate(*shell, &mut cmd, "popline", &mut std::io::stdout());

    Ok(())
}

/// Popup host with no window - the CLI drives deliveries headlessly.
#[derive(Default)]
struct HeadlessHost {
    exists: bool,
    visible: bool,
}

impl PopupHost for HeadlessHost {
    fn exists(&self) -> bool {
        self.exists
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn create(&mut self, _size: PopupSize) -> Result<(), DeliveryError> {
        self.exists = true;
        Ok(())
    }

    fn destroy(&mut self) {
        self.exists = false;
        self.visible = false;
    }

    fn set_position(&mut self, _position: Position) {}

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}
