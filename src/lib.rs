/*!
dragonfly-lib
=====

This crate builds canonical dragonfly interconnection networks for a host simulator. The host gives its endpoints (cache, directory, and DMA controllers) and receives the routers, the links from endpoints to routers, and the labelled links between routers.

# Usage

This crate is `dragonfly-lib`. To use it add `dragonfly-lib` to your dependencies in your project's `Cargo.toml`.

```toml
[dependencies]
dragonfly-lib = "0.1"
```

Alternatively, the binary `dragonfly` dumps the generated network and its address map from a configuration file.

# Public Interface

A network is described by [DragonflyOptions](config::DragonflyOptions). The [Dragonfly](topology::dragonfly::Dragonfly) builder checks the sizes and generates a [Topology](topology::Topology) for a list of [Endpoint](endpoint::Endpoint)s.
```ignore
let options = DragonflyOptions::from_file(Path::new("dragonfly.yaml"))?;
let dragonfly = Dragonfly::new(&options)?;
let topology = dragonfly.build(&options.controllers())?;
```
A host simulator implementing [HostNetwork](network::HostNetwork) can instead call [make_topology](network::make_topology), which also creates the host objects. The memory is split among the routers by [register_topology](address::register_topology).

# Sizes

A canonical dragonfly with `a` routers per group and `h` global channels per router has `g=a*h+1` groups and `a*g` routers. Any other number of routers is rejected. Each router has `a-1` local ports and `h` global ports in each direction.

With `N` endpoints and `R` routers, endpoint `i` is attached to router `i%R`, except for the last `N%R` endpoints, which are attached to router 0 as allowed by the [OverflowPolicy](config::OverflowPolicy).

# Configuration Syntax

Options are written in YAML. See the [config] module.
```yaml
num_cpus: 18
routers_per_group: 2
global_channels_per_router: 4
mem_size: 512MB
num_dirs: 18
```

# Terminal use

```text
dragonfly --config dragonfly.yaml --format adjacency --output network.txt
dragonfly --num_cpus 36 --routers_per_group 4 --global_channels_per_router 2 --summary --address_map
```
The topology is written to the standard output unless `--output` is given, in which case the reports of `--summary` and `--address_map` take the standard output; otherwise they go to the standard error. Errors are printed and the process exits with a non-zero code. The log level is selected with `RUST_LOG`, `info` by default.

*/

// Allow some clippy lints.
#![allow(clippy::needless_range_loop)]
#![allow(clippy::type_complexity)]
#![allow(clippy::new_without_default)]

pub mod error;
pub mod matrix;
pub mod endpoint;
pub mod config;
pub mod topology;
pub mod address;
pub mod network;

use std::fs::File;
use std::io::{self,Write};
use std::path::Path;

use log::info;

use address::AddressLayout;
use config::DragonflyOptions;
use error::Error;
use topology::{ExportFormat,LinkClass,Topology};
use topology::dragonfly::Dragonfly;

///Cycles of the host simulator.
pub type Time = u64;

pub fn get_version_number() -> &'static str
{
	match option_env!("CARGO_PKG_VERSION")
	{
		Some( version ) => version,
		_ => "?",
	}
}

/// The default options to be used in a terminal application.
pub fn terminal_default_options() -> getopts::Options
{
	let mut opts = getopts::Options::new();
	opts.optopt("c","config","YAML file with the options of the dragonfly","FILE");
	opts.optopt("","num_cpus","number of routers, one per CPU","NUMBER");
	opts.optopt("","routers_per_group","routers in each group","NUMBER");
	opts.optopt("","global_channels_per_router","ports of each router towards other groups","NUMBER");
	opts.optopt("","link_latency","latency of the links, in cycles","CYCLES");
	opts.optopt("","global_link_latency","latency of the links between groups, in cycles","CYCLES");
	opts.optopt("","router_latency","latency of the routers, in cycles","CYCLES");
	opts.optopt("","mem_size","physical memory to split among routers","SIZE");
	opts.optopt("","num_dirs","number of directory controllers","NUMBER");
	opts.optopt("","num_dmas","number of DMA controllers","NUMBER");
	opts.optopt("","overflow_policy","what to do with endpoints beyond the uniform distribution","Accept|DmaOnly|Reject");
	opts.optopt("f","format","how to write the topology","adjacency|yaml");
	opts.optopt("o","output","file in which to write the topology, instead of the standard output","FILE");
	opts.optflag("","address_map","print the address range of each router");
	opts.optflag("","summary","print the groups, link counts, diameter, and trunking of the topology");
	opts.optflag("h","help","show this help");
	opts.optflag("V","version","show the version");
	opts
}

/// Everything the `dragonfly` binary does after the logger has been set.
pub fn terminal_main(args:&[String]) -> Result<(),Error>
{
	let stdout = io::stdout();
	let stderr = io::stderr();
	terminal_run(args,&mut stdout.lock(),&mut stderr.lock())
}

/**
Run the terminal application with explicit writers, `stdout` and `stderr` for the binary.
The topology goes to `output` unless `--output` is given. The `--summary` and `--address_map` reports go to `output` only when the topology went to a file, and to `report` otherwise.
**/
pub fn terminal_run<O:Write,R:Write>(args:&[String], output:&mut O, report:&mut R) -> Result<(),Error>
{
	let opts = terminal_default_options();
	let program = args.first().map(|s|s.as_str()).unwrap_or("dragonfly");
	let matches = opts.parse(args.iter().skip(1)).map_err(|e|error!(bad_argument,"arguments",&e.to_string()))?;
	if matches.opt_present("help")
	{
		write!(output,"{}",opts.usage(&format!("Usage: {} [options]",program))).map_err(|e|error!(could_not_write,e))?;
		return Ok(());
	}
	if matches.opt_present("version")
	{
		writeln!(output,"dragonfly-lib version {}",get_version_number()).map_err(|e|error!(could_not_write,e))?;
		return Ok(());
	}
	let mut options = match matches.opt_str("config")
	{
		Some(path) => DragonflyOptions::from_file(Path::new(&path))?,
		None => DragonflyOptions::default(),
	};
	options.override_from(&matches)?;
	let format:ExportFormat = match matches.opt_str("format")
	{
		Some(text) => text.parse()?,
		None => ExportFormat::Yaml,
	};
	let dragonfly = Dragonfly::new(&options)?;
	info!("dragonfly of {} groups with {} routers each",dragonfly.size().number_of_groups(),dragonfly.size().routers_per_group());
	let topology = dragonfly.build(&options.controllers())?;
	let report:&mut dyn Write = match matches.opt_str("output")
	{
		Some(path) =>
		{
			let mut file = File::create(&path).map_err(|e|error!(could_not_open_file,Path::new(&path).to_path_buf(),e))?;
			topology.write_to_file(&mut file,format)?;
			info!("topology written to {}",path);
			output
		},
		None =>
		{
			topology.write_to_file(output,format)?;
			report
		},
	};
	if matches.opt_present("summary")
	{
		write_summary(&mut *report,&topology).map_err(|e|error!(could_not_write,e))?;
	}
	if matches.opt_present("address_map")
	{
		let layout = address::address_ranges(options.num_cpus,options.mem_size)?;
		write_address_map(&mut *report,&layout).map_err(|e|error!(could_not_write,e))?;
	}
	Ok(())
}

/// One line per router with its address range, plus the unassigned bytes if any.
pub fn write_address_map<W:Write+?Sized>(writer:&mut W, layout:&AddressLayout) -> io::Result<()>
{
	for range in layout.ranges.iter()
	{
		writeln!(writer,"router {} [{:#x}, {:#x})",range.region,range.start,range.end())?;
	}
	if layout.unassigned_bytes()>0
	{
		writeln!(writer,"unassigned {} bytes",layout.unassigned_bytes())?;
	}
	Ok(())
}

/// Some human-readable figures of a topology.
pub fn write_summary<W:Write+?Sized>(writer:&mut W, topology:&Topology) -> io::Result<()>
{
	let size = topology.size();
	writeln!(writer,"groups: {}",size.number_of_groups())?;
	writeln!(writer,"routers per group: {}",size.routers_per_group())?;
	writeln!(writer,"global channels per router: {}",size.global_channels_per_router())?;
	writeln!(writer,"external links: {}",topology.external_links().len())?;
	writeln!(writer,"global links: {}",topology.links_of_class(LinkClass::Global).count())?;
	writeln!(writer,"local links: {}",topology.links_of_class(LinkClass::Local).count())?;
	writeln!(writer,"diameter: {}",topology.diameter())?;
	let trunking = topology.trunking_distribution();
	let min_trunk = trunking.outside_diagonal().min().copied().unwrap_or(0);
	let max_trunk = trunking.outside_diagonal().max().copied().unwrap_or(0);
	writeln!(writer,"global links between two groups: min {} max {}",min_trunk,max_trunk)?;
	Ok(())
}
