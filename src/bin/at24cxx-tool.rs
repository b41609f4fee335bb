#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate at24cxx_eeprom;
use at24cxx_eeprom::*;

use std::process::exit;

use at24cxx_eeprom::bus::{
	I2cAddress,
	LinuxI2cBus,
};
use at24cxx_eeprom::eeprom::Eeprom;

fn parse_number(what: &str, s: &str) -> AResult<usize> {
	let result = if s.starts_with("0x") || s.starts_with("0X") {
		usize::from_str_radix(&s[2..], 16)
	} else {
		s.parse::<usize>()
	};
	match result {
		Ok(v) => Ok(v),
		Err(e) => bail!("invalid {}: {:?} ({})", what, s, e),
	}
}

fn parse_hex_payload(s: &str) -> AResult<Vec<u8>> {
	ensure!(!s.is_empty(), "empty payload");
	ensure!(s.len() % 2 == 0, "payload needs an even number of hex digits: {:?}", s);
	let mut data = Vec::with_capacity(s.len() / 2);
	for i in (0..s.len()).step_by(2) {
		match u8::from_str_radix(&s[i..i + 2], 16) {
			Ok(byte) => data.push(byte),
			Err(e) => bail!("invalid hex byte {:?} in payload: {}", &s[i..i + 2], e),
		}
	}
	Ok(data)
}

fn print_hex(offset: usize, data: &[u8]) {
	for (index, row) in data.chunks(16).enumerate() {
		let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
		println!("0x{:04x}: {}", offset + index * 16, hex.join(" "));
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(setting: clap::AppSettings::SubcommandRequiredElseHelp)
		(@arg bus: --bus +takes_value "I2C bus device (default: /dev/i2c-1)")
		(@arg addr: --addr +takes_value "7-bit chip address in hex (default: 0x50)")
		(@arg variant: --variant +takes_value "Chip size in kbit, e.g. 32 for an AT24C32 (default: 32)")
		(@subcommand read =>
			(about: "Read a byte range and print it as hex")
			(@arg offset: +required "Start offset in bytes (decimal or 0x-hex)")
			(@arg length: +required "Number of bytes")
		)
		(@subcommand write =>
			(about: "Write a payload at an offset")
			(@arg offset: +required "Start offset in bytes")
			(@arg data: +required "Payload as hex digits, e.g. deadbeef")
		)
		(@subcommand update =>
			(about: "Write only the bytes that differ from the stored contents")
			(@arg offset: +required "Start offset in bytes")
			(@arg data: +required "Payload as hex digits")
		)
		(@subcommand wipe =>
			(about: "Reset the whole device to the erased state (0xff)")
		)
		(@subcommand dump =>
			(about: "Page-aligned hexdump")
			(@arg offset: "Start offset in bytes (default: 0)")
			(@arg length: "Number of bytes (default: up to end of device)")
		)
	).get_matches();

	let bus_path = matches.value_of("bus").unwrap_or("/dev/i2c-1");
	let addr: I2cAddress = matches.value_of("addr").unwrap_or("0x50").parse()?;
	let variant = parse_number("chip size", matches.value_of("variant").unwrap_or("32"))?;

	let bus = LinuxI2cBus::open(bus_path)?;
	let mut eeprom = Eeprom::open(bus, addr, variant)?;

	match matches.subcommand() {
		("read", Some(sub)) => {
			let offset = parse_number("offset", sub.value_of("offset").unwrap())?;
			let length = parse_number("length", sub.value_of("length").unwrap())?;
			let data = eeprom.read(offset, length)?;
			print_hex(offset, &data);
		}
		("write", Some(sub)) => {
			let offset = parse_number("offset", sub.value_of("offset").unwrap())?;
			let data = parse_hex_payload(sub.value_of("data").unwrap())?;
			eeprom.write(offset, &data)?;
			info!("wrote {} bytes at 0x{:04x}", data.len(), offset);
		}
		("update", Some(sub)) => {
			let offset = parse_number("offset", sub.value_of("offset").unwrap())?;
			let data = parse_hex_payload(sub.value_of("data").unwrap())?;
			eeprom.update(offset, &data)?;
			info!("device matches payload of {} bytes at 0x{:04x}", data.len(), offset);
		}
		("wipe", _) => {
			eeprom.wipe()?;
			info!("wiped {} pages", eeprom.page_count());
		}
		("dump", Some(sub)) => {
			let offset = match sub.value_of("offset") {
				Some(s) => parse_number("offset", s)?,
				None => 0,
			};
			let length = match sub.value_of("length") {
				Some(s) => parse_number("length", s)?,
				None => eeprom.capacity() - offset,
			};
			for line in eeprom.dump_pages(offset, length)? {
				println!("{}", line);
			}
		}
		(other, _) => bail!("unknown subcommand: {:?}", other),
	}

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
