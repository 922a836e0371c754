#[cfg(not(unix))]
compile_error!("f75111-gpio needs the unix /dev/port backend");

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use f75111_gpio::{
    poll_once, registers, BusConfig, DevPort, DisplaySink, DisplayUpdate, Error, F75111,
    GpioLevel, GpioPin, Intent, Mode, PollConfig, Poller, Result,
};

/// Control the eight F75111 DIO lines over the chipset SMBus
///
/// Requires raw port access through /dev/port (run as root or with
/// CAP_SYS_RAWIO). The chip is put in input mode every time the tool starts.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Port I/O device node
    #[arg(long, default_value = registers::DEFAULT_PORT_DEVICE)]
    device: PathBuf,
    /// Input polling interval in milliseconds
    #[arg(long, default_value_t = 200)]
    poll_ms: u64,
    /// Check the SMBus host status register after every transaction
    #[arg(long)]
    verify_status: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive menu with live input display (default)
    Shell,
    /// Print input levels for a number of polling cycles
    Watch {
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },
    /// Switch to output mode and drive pins, e.g. `drive 1=high 7=low`
    Drive {
        #[arg(required = true, value_parser = parse_assignment)]
        pins: Vec<(GpioPin, GpioLevel)>,
    },
}

fn parse_level(s: &str) -> std::result::Result<GpioLevel, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "h" | "high" | "on" => Ok(GpioLevel::High),
        "0" | "l" | "low" | "off" => Ok(GpioLevel::Low),
        other => Err(format!("invalid level '{}' (expected high/low or 1/0)", other)),
    }
}

fn parse_pin(s: &str) -> std::result::Result<GpioPin, String> {
    let number: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid pin number '{}'", s.trim()))?;
    GpioPin::new(number).map_err(|e| e.to_string())
}

fn parse_assignment(s: &str) -> std::result::Result<(GpioPin, GpioLevel), String> {
    let (pin, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PIN=LEVEL, got '{}'", s))?;
    Ok((parse_pin(pin)?, parse_level(level)?))
}

fn format_levels(levels: &[Option<GpioLevel>; GpioPin::COUNT]) -> String {
    levels
        .iter()
        .zip(GpioPin::all())
        .map(|(level, pin)| match level {
            Some(level) => format!("{}:{}", pin.number(), level),
            None => format!("{}:-", pin.number()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints one status line per polling cycle.
struct ConsoleSink {
    levels: [Option<GpioLevel>; GpioPin::COUNT],
    inline: bool,
}

impl ConsoleSink {
    fn new(inline: bool) -> Self {
        Self {
            levels: [None; GpioPin::COUNT],
            inline,
        }
    }
}

impl DisplaySink for ConsoleSink {
    fn show(&mut self, update: DisplayUpdate) {
        match update {
            DisplayUpdate::Level { pin, level } => {
                self.levels[usize::from(pin.number() - 1)] = level;
                // Pin 8 closes a cycle
                if usize::from(pin.number()) == GpioPin::COUNT {
                    let line = format_levels(&self.levels);
                    if self.inline {
                        print!("\rInputs: {}", line);
                        let _ = io::stdout().flush();
                    } else {
                        println!("Inputs: {}", line);
                    }
                }
            }
            DisplayUpdate::ModeChanged(mode) => println!("GPIO switched to {} mode", mode),
            DisplayUpdate::Driven { .. } => {}
        }
    }
}

/// Lines to print for the updates returned by an intent.
fn render_lines(updates: &[DisplayUpdate]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut driven = [None; GpioPin::COUNT];
    let mut any_driven = false;
    let mut blanked = false;
    for update in updates {
        match *update {
            DisplayUpdate::ModeChanged(mode) => {
                lines.push(format!("GPIO switched to {} mode", mode))
            }
            DisplayUpdate::Driven { pin, level } => {
                driven[usize::from(pin.number() - 1)] = Some(level);
                any_driven = true;
            }
            DisplayUpdate::Level { level: None, .. } => blanked = true,
            DisplayUpdate::Level { .. } => {}
        }
    }
    // Overwrites the inline line left by the poller
    if blanked {
        lines.push(format!("Inputs: {}", format_levels(&[None; GpioPin::COUNT])));
    }
    if any_driven {
        lines.push(format!("Outputs: {}", format_levels(&driven)));
    }
    lines
}

fn render(updates: &[DisplayUpdate]) {
    for line in render_lines(updates) {
        println!("{}", line);
    }
}

fn print_menu() {
    println!();
    println!("===== F75111 GPIO =====");
    println!("1. Switch to input mode");
    println!("2. Switch to output mode");
    println!("3. All outputs high");
    println!("4. All outputs low");
    println!("5. Set one output");
    println!("6. Show GPIO state");
    println!("0. Quit");
    print!("Choice: ");
    let _ = io::stdout().flush();
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    text: &str,
) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    lines.next().transpose().map_err(Error::from)
}

fn show_state(device: &F75111<DevPort>) -> Result<()> {
    match device.mode() {
        Mode::Input => {
            println!("Mode: input");
            if let Some(inputs) = device.sample_inputs()? {
                let levels = inputs.levels().map(|(_, level)| Some(level));
                println!("Inputs: {}", format_levels(&levels));
            }
        }
        Mode::Output => {
            let shadow = device.shadow();
            println!("Mode: output");
            println!(
                "SET1 output: 0x{:02X}, SET2 output: 0x{:02X}",
                shadow.set1, shadow.set2
            );
        }
    }
    Ok(())
}

fn shell(device: F75111<DevPort>, poll_config: PollConfig) -> Result<()> {
    let device = Arc::new(device);
    let poller = Poller::spawn(Arc::clone(&device), poll_config, ConsoleSink::new(true))?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_menu();
        let Some(choice) = lines.next().transpose()? else {
            break;
        };
        println!();
        let intent = match choice.trim() {
            "1" => Intent::SwitchToInput,
            "2" => Intent::SwitchToOutput,
            "3" => Intent::SetAllHigh,
            "4" => Intent::SetAllLow,
            "5" => {
                let Some(pin) = prompt(&mut lines, "Pin (1-8): ")? else {
                    break;
                };
                let pin = match parse_pin(&pin) {
                    Ok(pin) => pin,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let Some(level) = prompt(&mut lines, "Level (1=high, 0=low): ")? else {
                    break;
                };
                match parse_level(&level) {
                    Ok(level) => Intent::SetPin { pin, level },
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                }
            }
            "6" => {
                if let Err(e) = show_state(&device) {
                    println!("Error: {}", e);
                }
                continue;
            }
            "0" | "q" => break,
            other => {
                println!("Unknown option '{}'", other);
                continue;
            }
        };
        match device.apply(intent) {
            Ok(updates) => render(&updates),
            Err(e) => println!("Error: {}", e),
        }
    }

    poller.stop();
    match Arc::try_unwrap(device) {
        Ok(device) => device.close(),
        Err(_) => log::warn!("Device still shared at exit; releasing on drop"),
    }
    Ok(())
}

fn watch(device: F75111<DevPort>, poll_config: PollConfig, count: usize) -> Result<()> {
    let mut sink = ConsoleSink::new(false);
    for cycle in 0..count {
        if cycle > 0 {
            std::thread::sleep(poll_config.interval);
        }
        poll_once(&device, &mut sink)?;
    }
    device.close();
    Ok(())
}

fn drive(device: F75111<DevPort>, pins: &[(GpioPin, GpioLevel)]) -> Result<()> {
    render(&device.apply(Intent::SwitchToOutput)?);
    for &(pin, level) in pins {
        render(&device.apply(Intent::SetPin { pin, level })?);
    }
    device.close();
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let bus_config = if cli.verify_status {
        BusConfig::verified()
    } else {
        BusConfig::default()
    };
    let poll_config = PollConfig::with_interval(Duration::from_millis(cli.poll_ms))?;
    let device = F75111::open_with_config(DevPort::load(&cli.device), bus_config)?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell(device, poll_config),
        Command::Watch { count } => watch(device, poll_config, count),
        Command::Drive { pins } => drive(device, &pins),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
