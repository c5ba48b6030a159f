//! Inspect CHIRP .img files
//! Decodes channels, dumps raw records, lists banks and checks the image checksum

use anyhow::{bail, Context};
use chirp_codec::drivers::{list_models, ChannelCodec, Radio};
use chirp_codec::formats::{open_img, save_codec};
use chirp_codec::memmap::hexdump;
use chirp_codec::{BankSlot, Memory, Metadata, PowerLevel, Skip};
use regex::Regex;
use std::env;
use std::ops::RangeInclusive;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

fn usage(prog: &str) {
    eprintln!("Usage: {} <command> [args]", prog);
    eprintln!("\nCommands:");
    eprintln!("  dump <file.img> [N | A-B] [--json]   Decode channels");
    eprintln!("  raw <file.img> <N>                   Hex dump of one record");
    eprintln!("  banks <file.img>                     Bank names");
    eprintln!("  checksum <file.img> [--fix <out>]    Verify or rewrite the checksum");
    eprintln!("  set <file.img> <N> <freq> [options]  Program a channel");
    eprintln!("      --name S --mode M --tmode T --tone HZ --duplex D --offset F");
    eprintln!("      --power P --skip S|P --bank A..Z --out <out.img>");
    eprintln!("  erase <file.img> <N> [--out <out.img>]  Empty a channel");
    eprintln!("  models                               Supported radios");
}

fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("chirp-img");
    let Some(command) = args.get(1) else {
        usage(prog);
        std::process::exit(1);
    };
    let rest = &args[2..];

    match command.as_str() {
        "dump" => dump(rest),
        "raw" => raw(rest),
        "banks" => banks(rest),
        "checksum" => checksum(rest),
        "set" => set(rest),
        "erase" => erase(rest),
        "models" => {
            for info in list_models() {
                println!(
                    "{:<20} {:>4} channels  {:>6} bytes",
                    info.full_name(),
                    info.channels,
                    info.memsize
                );
            }
            Ok(())
        }
        _ => {
            usage(prog);
            bail!("Unknown command: {}", command);
        }
    }
}

fn open(path: Option<&String>) -> anyhow::Result<(ChannelCodec, Metadata)> {
    let path = path.context("Missing .img file argument")?;
    let (codec, metadata) = open_img(path).with_context(|| format!("Opening {}", path))?;
    tracing::info!(
        "Radio: {} (rclass {:?}, version {:?})",
        codec.get_name(),
        metadata.rclass,
        metadata.chirp_version
    );
    Ok((codec, metadata))
}

/// Parse `N` or `A-B`
fn parse_range(text: &str) -> anyhow::Result<RangeInclusive<u32>> {
    let re = Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$")?;
    let caps = re
        .captures(text)
        .with_context(|| format!("Invalid channel range: {}", text))?;
    let start: u32 = caps[1].parse()?;
    let end: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse()?,
        None => start,
    };
    if end < start {
        bail!("Invalid channel range: {}", text);
    }
    Ok(start..=end)
}

fn dump(args: &[String]) -> anyhow::Result<()> {
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let (codec, _) = open(positional.first().copied())?;

    let memories: Vec<Memory> = match positional.get(1) {
        None => codec.get_memories()?,
        Some(range) => {
            let mut out = Vec::new();
            for number in parse_range(range)? {
                out.push(codec.get_memory(number)?);
            }
            out
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&memories)?);
        return Ok(());
    }

    println!("{} ({} channels shown)\n", codec.get_name(), memories.len());
    for mem in &memories {
        println!("{}", mem);
        if let Some(slot) = mem.bank {
            println!("    bank {} index {}", slot.bank, slot.index);
        }
    }
    Ok(())
}

fn raw(args: &[String]) -> anyhow::Result<()> {
    let (codec, _) = open(args.first())?;
    let number: u32 = args
        .get(1)
        .context("Missing channel number")?
        .parse()
        .context("Channel number must be an integer")?;

    let d = codec.descriptor();
    let slot = d.slot(number)?;
    let base = d.records.offset(slot)?;
    let bytes = codec.get_raw_memory(number)?;
    println!("Memory #{} at 0x{:04x}", number, base);
    print!("{}", hexdump(base, &bytes));
    println!("{}", codec.get_memory(number)?);
    Ok(())
}

fn banks(args: &[String]) -> anyhow::Result<()> {
    let (codec, _) = open(args.first())?;
    let names = codec.get_banks()?;
    if names.is_empty() {
        println!("{} has no banks", codec.get_name());
        return Ok(());
    }
    for (i, name) in names.iter().enumerate() {
        let letter = char::from(b'A' + i as u8);
        if name.is_empty() {
            println!("Bank {}: (unnamed)", letter);
        } else {
            println!("Bank {}: \"{}\"", letter, name);
        }
    }
    Ok(())
}

fn checksum(args: &[String]) -> anyhow::Result<()> {
    let (codec, metadata) = open(args.first())?;
    let out = match args.get(1).map(String::as_str) {
        Some("--fix") => Some(args.get(2).context("--fix needs an output file")?),
        Some(other) => bail!("Unexpected argument: {}", other),
        None => None,
    };

    match codec.verify_checksum()? {
        None => println!("{} images carry no checksum", codec.get_name()),
        Some((stored, computed)) if stored == computed => {
            println!("Checksum OK: {:02x}", stored)
        }
        Some((stored, computed)) => {
            println!("Checksum MISMATCH: stored {:02x}, computed {:02x}", stored, computed)
        }
    }

    if let Some(path) = out {
        save_codec(path, codec, Some(&metadata)).with_context(|| format!("Writing {}", path))?;
        println!("Wrote {}", path);
    }
    Ok(())
}

/// Value following `--flag`, if the flag is present
fn option<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => match args.get(i + 1) {
            Some(value) => Ok(Some(value.as_str())),
            None => bail!("{} needs a value", flag),
        },
        None => Ok(None),
    }
}

fn channel_number(codec: &ChannelCodec, text: Option<&String>) -> anyhow::Result<u32> {
    let number: u32 = text
        .context("Missing channel number")?
        .parse()
        .context("Channel number must be an integer")?;
    let rf = codec.get_features();
    if !rf.in_bounds(number) {
        bail!(
            "Channel {} out of range {}-{}",
            number,
            rf.memory_bounds.0,
            rf.memory_bounds.1
        );
    }
    Ok(number)
}

/// Match a power argument against the radio's levels, by label or wattage
fn pick_power(codec: &ChannelCodec, text: &str) -> anyhow::Result<PowerLevel> {
    let levels = codec.get_features().valid_power_levels;
    if levels.is_empty() {
        bail!("{} has no selectable power levels", codec.get_name());
    }
    let wanted = match levels.iter().find(|l| l.label().eq_ignore_ascii_case(text)) {
        Some(level) => level.clone(),
        None => PowerLevel::parse(text)?,
    };
    if let Some(level) = levels.iter().find(|l| l.matches(&wanted)) {
        return Ok(level.clone());
    }
    let choices: Vec<String> = levels
        .iter()
        .map(|l| format!("{} ({:.1}W)", l.label(), l.watts()))
        .collect();
    bail!("No power level matches {}, choose from {}", text, choices.join(", "))
}

fn set(args: &[String]) -> anyhow::Result<()> {
    let (mut codec, metadata) = open(args.first())?;
    let number = channel_number(&codec, args.get(1))?;
    let freq = Memory::parse_freq(args.get(2).context("Missing frequency")?)?;

    let mut mem = match codec.get_memory(number)? {
        mem if mem.empty => Memory::new(number),
        mem => mem,
    };
    mem.freq = freq;

    if let Some(name) = option(args, "--name")? {
        mem.name = codec.filter_name(name);
    }
    if let Some(mode) = option(args, "--mode")? {
        mem.mode = mode.to_string();
    }
    if let Some(tmode) = option(args, "--tmode")? {
        mem.tmode = tmode.to_string();
    }
    if let Some(tone) = option(args, "--tone")? {
        let hz: f32 = tone.parse().context("Tone must be a number")?;
        mem.rtone = hz;
        mem.ctone = hz;
    }
    if let Some(duplex) = option(args, "--duplex")? {
        mem.duplex = duplex.to_string();
    }
    if let Some(offset) = option(args, "--offset")? {
        mem.offset = Memory::parse_freq(offset)?;
    }
    if let Some(power) = option(args, "--power")? {
        mem.power = Some(pick_power(&codec, power)?);
    }
    if let Some(skip) = option(args, "--skip")? {
        mem.skip = skip.parse::<Skip>()?;
    }
    if let Some(bank) = option(args, "--bank")? {
        let letter = match bank.as_bytes() {
            [b] if b.is_ascii_alphabetic() => b.to_ascii_uppercase() - b'A',
            _ => bail!("Bank must be a letter, got {}", bank),
        };
        let index = match mem.bank {
            Some(slot) if slot.bank == letter => slot.index,
            _ => codec.get_available_bank_index(letter)?,
        };
        mem.bank = Some(BankSlot {
            bank: letter,
            index,
        });
    }

    codec.set_memory(&mem)?;
    println!("{}", codec.get_memory(number)?);

    let out = option(args, "--out")?.unwrap_or(args[0].as_str());
    save_codec(out, codec, Some(&metadata)).with_context(|| format!("Writing {}", out))?;
    println!("Wrote {}", out);
    Ok(())
}

fn erase(args: &[String]) -> anyhow::Result<()> {
    let (mut codec, metadata) = open(args.first())?;
    let number = channel_number(&codec, args.get(1))?;
    codec.delete_memory(number)?;

    let out = option(args, "--out")?.unwrap_or(args[0].as_str());
    save_codec(out, codec, Some(&metadata)).with_context(|| format!("Writing {}", out))?;
    println!("Erased memory #{}, wrote {}", number, out);
    Ok(())
}
