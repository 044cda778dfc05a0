/*!

Options of a dragonfly build.

They are read from a YAML file and may be overridden from the command line. For example
```yaml
num_cpus: 18
routers_per_group: 2
global_channels_per_router: 4
link_latency: 1
#global_link_latency: 10 #defaults to link_latency
router_latency: 1
mem_size: 512MB
num_dirs: 18
num_dmas: 2
overflow_policy: DmaOnly
```

Only `routers_per_group` and `global_channels_per_router` lack a default value.

*/

use std::convert::TryFrom;
use std::fmt::{self,Display,Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize,Deserialize};

use crate::endpoint::{Controller,EndpointKind};
use crate::error::Error;
use crate::{error,Time};

/**
What to do with the endpoints that exceed the uniform distribution.

When there are `N` endpoints for `R` routers the first `N - N%R` endpoints are evenly spread and the last `N%R` are attached to router 0.
These are expected to be auxiliary endpoints of little traffic, typically DMA controllers.
**/
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub enum OverflowPolicy
{
	///Attach any remaining endpoint to router 0.
	Accept,
	///Attach remaining DMA controllers to router 0. Other kinds are an error.
	DmaOnly,
	///Every router must get the same number of endpoints.
	Reject,
}

impl Default for OverflowPolicy
{
	fn default() -> OverflowPolicy
	{
		OverflowPolicy::Accept
	}
}

impl OverflowPolicy
{
	///Decide whether the overflowing endpoint at position `endpoint` may be attached to router 0.
	pub fn admit(self, endpoint:usize, kind:EndpointKind) -> Result<(),Error>
	{
		let admitted = match self
		{
			OverflowPolicy::Accept => true,
			OverflowPolicy::DmaOnly => kind==EndpointKind::Dma,
			OverflowPolicy::Reject => false,
		};
		if admitted
		{
			Ok(())
		}
		else
		{
			Err(error!(overflow_rejected,endpoint,kind.to_string()).with_message(format!("overflow policy is {:?}",self)))
		}
	}
}

impl FromStr for OverflowPolicy
{
	type Err = Error;
	fn from_str(s:&str) -> Result<OverflowPolicy,Error>
	{
		match s
		{
			"Accept" | "accept" => Ok(OverflowPolicy::Accept),
			"DmaOnly" | "dma_only" | "dma" => Ok(OverflowPolicy::DmaOnly),
			"Reject" | "reject" => Ok(OverflowPolicy::Reject),
			_ => Err(error!(bad_argument,"overflow_policy",s)),
		}
	}
}

/**
An amount of bytes. Written either as an integer or as a string with a unit. Units are binary, so `1kB` and `1KiB` both are 1024 bytes.
**/
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Serialize,Deserialize)]
#[serde(try_from="RawMemorySize")]
pub struct MemorySize(pub u64);

impl MemorySize
{
	pub fn bytes(self) -> u64
	{
		self.0
	}
}

impl Default for MemorySize
{
	fn default() -> MemorySize
	{
		MemorySize(512<<20)
	}
}

impl Display for MemorySize
{
	fn fmt(&self, f:&mut Formatter<'_>) -> fmt::Result
	{
		write!(f,"{}B",self.0)
	}
}

impl FromStr for MemorySize
{
	type Err = Error;
	fn from_str(s:&str) -> Result<MemorySize,Error>
	{
		let text = s.trim();
		let split = text.find(|c:char|!c.is_ascii_digit()).unwrap_or(text.len());
		let (digits,unit) = text.split_at(split);
		let value:u64 = digits.parse().map_err(|_|error!(bad_argument,"mem_size",s))?;
		let shift = match unit.trim()
		{
			"" | "B" => 0,
			"kB" | "KB" | "KiB" => 10,
			"MB" | "MiB" => 20,
			"GB" | "GiB" => 30,
			"TB" | "TiB" => 40,
			_ => return Err(error!(bad_argument,"mem_size",s)),
		};
		value.checked_mul(1u64<<shift).map(MemorySize).ok_or_else(||error!(bad_argument,"mem_size",s))
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMemorySize
{
	Bytes(u64),
	Text(String),
}

impl TryFrom<RawMemorySize> for MemorySize
{
	type Error = Error;
	fn try_from(raw:RawMemorySize) -> Result<MemorySize,Error>
	{
		match raw
		{
			RawMemorySize::Bytes(bytes) => Ok(MemorySize(bytes)),
			RawMemorySize::Text(text) => text.parse(),
		}
	}
}

fn default_num_cpus() -> usize { 1 }
fn default_latency() -> Time { 1 }
fn default_num_dirs() -> usize { 1 }

///Everything required to build a dragonfly and to register its address ranges.
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DragonflyOptions
{
	///Number of routers. Also the number of CPUs, each with its cache controller.
	#[serde(default="default_num_cpus")]
	pub num_cpus: usize,
	///Number of routers in each group. `a` in Dally's paper.
	#[serde(default)]
	pub routers_per_group: Option<usize>,
	///Number of ports per router to routers in other groups. `h` in Dally's paper.
	#[serde(default)]
	pub global_channels_per_router: Option<usize>,
	#[serde(default="default_latency")]
	pub link_latency: Time,
	///Latency of the links between groups. `link_latency` if not given.
	#[serde(default)]
	pub global_link_latency: Option<Time>,
	#[serde(default="default_latency")]
	pub router_latency: Time,
	#[serde(default)]
	pub mem_size: MemorySize,
	#[serde(default="default_num_dirs")]
	pub num_dirs: usize,
	#[serde(default)]
	pub num_dmas: usize,
	#[serde(default)]
	pub overflow_policy: OverflowPolicy,
}

impl Default for DragonflyOptions
{
	fn default() -> DragonflyOptions
	{
		DragonflyOptions{
			num_cpus: default_num_cpus(),
			routers_per_group: None,
			global_channels_per_router: None,
			link_latency: default_latency(),
			global_link_latency: None,
			router_latency: default_latency(),
			mem_size: MemorySize::default(),
			num_dirs: default_num_dirs(),
			num_dmas: 0,
			overflow_policy: OverflowPolicy::default(),
		}
	}
}

impl DragonflyOptions
{
	///Default options with the given sizes.
	pub fn sized(num_cpus:usize, routers_per_group:usize, global_channels_per_router:usize) -> DragonflyOptions
	{
		DragonflyOptions{
			num_cpus,
			routers_per_group: Some(routers_per_group),
			global_channels_per_router: Some(global_channels_per_router),
			..Default::default()
		}
	}
	pub fn from_yaml(text:&str) -> Result<DragonflyOptions,Error>
	{
		serde_yaml::from_str(text).map_err(|e|error!(ill_formed_configuration,e))
	}
	pub fn from_file(path:&Path) -> Result<DragonflyOptions,Error>
	{
		let text = fs::read_to_string(path).map_err(|e|error!(could_not_open_file,path.to_path_buf(),e))?;
		DragonflyOptions::from_yaml(&text).map_err(|e|e.with_message(format!("while reading {}",path.display())))
	}
	pub fn routers_per_group(&self) -> Result<usize,Error>
	{
		self.routers_per_group.ok_or_else(||error!(missing_parameter,"routers_per_group"))
	}
	pub fn global_channels_per_router(&self) -> Result<usize,Error>
	{
		self.global_channels_per_router.ok_or_else(||error!(missing_parameter,"global_channels_per_router"))
	}
	pub fn global_link_latency(&self) -> Time
	{
		self.global_link_latency.unwrap_or(self.link_latency)
	}
	///The endpoints of the simulated system: a cache controller per CPU, then the directory controllers, then the DMA controllers.
	pub fn controllers(&self) -> Vec<Controller>
	{
		let caches = (0..self.num_cpus).map(|index|Controller::new(EndpointKind::Cache,index));
		let directories = (0..self.num_dirs).map(|index|Controller::new(EndpointKind::Directory,index));
		let dmas = (0..self.num_dmas).map(|index|Controller::new(EndpointKind::Dma,index));
		caches.chain(directories).chain(dmas).collect()
	}
	///Replace the values given in the command line.
	pub fn override_from(&mut self, matches:&getopts::Matches) -> Result<(),Error>
	{
		if let Some(value) = parse_opt(matches,"num_cpus")? { self.num_cpus = value; }
		if let Some(value) = parse_opt(matches,"routers_per_group")? { self.routers_per_group = Some(value); }
		if let Some(value) = parse_opt(matches,"global_channels_per_router")? { self.global_channels_per_router = Some(value); }
		if let Some(value) = parse_opt(matches,"link_latency")? { self.link_latency = value; }
		if let Some(value) = parse_opt(matches,"global_link_latency")? { self.global_link_latency = Some(value); }
		if let Some(value) = parse_opt(matches,"router_latency")? { self.router_latency = value; }
		if let Some(value) = matches.opt_str("mem_size") { self.mem_size = value.parse()?; }
		if let Some(value) = parse_opt(matches,"num_dirs")? { self.num_dirs = value; }
		if let Some(value) = parse_opt(matches,"num_dmas")? { self.num_dmas = value; }
		if let Some(value) = matches.opt_str("overflow_policy") { self.overflow_policy = value.parse()?; }
		Ok(())
	}
}

fn parse_opt<T:FromStr>(matches:&getopts::Matches, name:&str) -> Result<Option<T>,Error>
{
	match matches.opt_str(name)
	{
		None => Ok(None),
		Some(text) => text.parse::<T>().map(Some).map_err(|_|error!(bad_argument,name,&text)),
	}
}
