/*!

The physical memory is split among the routers. Router `i` owns the `i`-th of `num_cpus` equal, contiguous ranges, and its range is registered against the host's [AddressMap] with the router index as region tag.

When `mem_size` is not a multiple of `num_cpus` the last `mem_size % num_cpus` bytes belong to no router.

*/

use log::{debug,warn};
use serde::Serialize;

use crate::config::{DragonflyOptions,MemorySize};
use crate::error::Error;
use crate::error;

/// The host service that records which nodes own which part of the memory.
pub trait AddressMap
{
	/// Register `size` bytes for the node group `nodes`, tagged with `region`.
	/// Ranges are registered in order of region, so each one starts where the previous ended.
	fn register_node(&mut self, nodes:&[usize], size:u64, region:usize);
}

#[derive(Clone,Debug,PartialEq,Eq,Serialize)]
pub struct AddressRange
{
	pub region: usize,
	pub nodes: Vec<usize>,
	pub start: u64,
	pub size: u64,
}

impl AddressRange
{
	///First address after the range.
	pub fn end(&self) -> u64
	{
		self.start+self.size
	}
	pub fn contains(&self, address:u64) -> bool
	{
		self.start<=address && address<self.end()
	}
}

///The split of the memory among routers.
#[derive(Clone,Debug,PartialEq,Eq,Serialize)]
pub struct AddressLayout
{
	pub mem_size: u64,
	pub ranges: Vec<AddressRange>,
}

impl AddressLayout
{
	pub fn new(num_cpus:usize, mem_size:MemorySize) -> Result<AddressLayout,Error>
	{
		if num_cpus==0
		{
			return Err(error!(bad_argument,"num_cpus","0").with_message("the memory cannot be split among zero routers".to_string()));
		}
		let total = mem_size.bytes();
		let size = total/num_cpus as u64;
		let ranges = (0..num_cpus).map(|region|AddressRange{
			region,
			nodes: vec![region],
			start: region as u64*size,
			size,
		}).collect();
		let layout = AddressLayout{ mem_size:total, ranges };
		let gap = layout.unassigned_bytes();
		if gap>0
		{
			warn!("{} is not a multiple of {} routers, the last {} bytes are not assigned to any router",mem_size,num_cpus,gap);
		}
		debug!("memory split in {} ranges of {} bytes",num_cpus,size);
		Ok(layout)
	}
	///Bytes at the end of the memory outside every range.
	pub fn unassigned_bytes(&self) -> u64
	{
		let assigned:u64 = self.ranges.iter().map(|range|range.size).sum();
		self.mem_size-assigned
	}
	///The region owning an address, if any.
	pub fn region_of(&self, address:u64) -> Option<usize>
	{
		let size = self.ranges.first()?.size;
		if size==0
		{
			return None;
		}
		let region = (address/size) as usize;
		self.ranges.get(region).filter(|range|range.contains(address)).map(|range|range.region)
	}
	///Register every range, in order.
	pub fn register<M:AddressMap+?Sized>(&self, map:&mut M)
	{
		for range in self.ranges.iter()
		{
			map.register_node(&range.nodes,range.size,range.region);
		}
	}
}

///The ranges of `num_cpus` routers sharing `mem_size` bytes.
pub fn address_ranges(num_cpus:usize, mem_size:MemorySize) -> Result<AddressLayout,Error>
{
	AddressLayout::new(num_cpus,mem_size)
}

///Split the memory of the options among its routers and register the ranges in `map`.
pub fn register_topology<M:AddressMap+?Sized>(options:&DragonflyOptions, map:&mut M) -> Result<AddressLayout,Error>
{
	let layout = address_ranges(options.num_cpus,options.mem_size)?;
	layout.register(map);
	Ok(layout)
}
