use itertools::iproduct;
use log::{debug,info,warn};
use serde::Serialize;

use super::prelude::*;
use crate::config::{DragonflyOptions,OverflowPolicy};
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::{error,Time};

/**
Builds a canonical dragonfly, this is, a hierarchical topology where each group is fully-connected (a complete graph) and each pair of groups is connected by a global link.

With `a` routers per group and `h` global ports per router there are `g = a*h+1` groups. Each router has `a-1` local ports, named `Local0` to `Local<a-2>`, and `h` global ports, named `Global0` to `Global<h-1>`.

Global links are arranged so that the global port `c` of the router at offset `r` of group `i` goes to the group `i+r*h+c+1`, modulo `g`. Its reverse link leaves from the router at offset `a-1-r` of the destination group, through its port `h-1-c`. This is the palm-tree arrangement of Marina García, with every group adjacent to every other group through exactly one pair of links.

The links are created in three phases, sharing one counter of link identifiers.
1. Links from endpoints to routers. See [distribute_endpoints].
2. Global links, of weight 2. See [global_links].
3. Local links, of weight 1. See [local_links].

The lower weight of local links makes the table-based routing of the host finish the traversal inside a group before taking a global link, which avoids cyclic dependencies.

Example options:
```yaml
num_cpus: 36
routers_per_group: 4
global_channels_per_router: 2
link_latency: 1
global_link_latency: 10
router_latency: 1
```
**/
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Dragonfly
{
	size: DragonflySize,
	link_latency: Time,
	global_link_latency: Time,
	router_latency: Time,
	overflow_policy: OverflowPolicy,
}

impl Dragonfly
{
	pub fn new(options:&DragonflyOptions) -> Result<Dragonfly,Error>
	{
		let routers_per_group = options.routers_per_group()?;
		let global_channels_per_router = options.global_channels_per_router()?;
		let size = DragonflySize::new(options.num_cpus,routers_per_group,global_channels_per_router)?;
		Ok(Dragonfly{
			size,
			link_latency: options.link_latency,
			global_link_latency: options.global_link_latency(),
			router_latency: options.router_latency,
			overflow_policy: options.overflow_policy,
		})
	}
	pub fn size(&self) -> DragonflySize
	{
		self.size
	}
	pub fn routers(&self) -> Vec<RouterDescriptor>
	{
		(0..self.size.num_routers()).map(|router_id|RouterDescriptor{router_id,latency:self.router_latency}).collect()
	}
	/**
	Build the whole topology for the given endpoints.
	The result is checked with [Topology::check_consistency] before being returned.
	**/
	pub fn build<E:Endpoint>(&self, endpoints:&[E]) -> Result<Topology,Error>
	{
		let routers = self.routers();
		let external_links = distribute_endpoints(endpoints,self.size.num_routers(),self.link_latency,self.overflow_policy)?;
		let mut internal_links = global_links(self.size,self.global_link_latency,external_links.len());
		let local = local_links(self.size,self.link_latency,external_links.len()+internal_links.len());
		internal_links.extend(local);
		let topology = Topology::new(self.size,routers,external_links,internal_links)?;
		topology.check_consistency()?;
		info!("built dragonfly with {} routers in {} groups, {} external links, {} global links, {} local links",
			topology.num_routers(),
			self.size.number_of_groups,
			topology.external_links().len(),
			topology.links_of_class(LinkClass::Global).count(),
			topology.links_of_class(LinkClass::Local).count(),
		);
		Ok(topology)
	}
}

///The dimensions of a canonical dragonfly. Only built through [DragonflySize::new], so `routers_per_group>0` and `number_of_groups=a*h+1` always hold.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub struct DragonflySize
{
	///Number of routers in a group. Dally called it `a`.
	routers_per_group: usize,
	///Number of ports per router that connect to routers in a different group. Dally called it `h`.
	global_channels_per_router: usize,
	///Number of groups. `g=a*h+1`.
	number_of_groups: usize,
}

impl DragonflySize
{
	///Checks that `num_routers` routers make a canonical dragonfly.
	pub fn new(num_routers:usize, routers_per_group:usize, global_channels_per_router:usize) -> Result<DragonflySize,Error>
	{
		if routers_per_group==0
		{
			return Err(error!(empty_group));
		}
		let number_of_groups = routers_per_group.checked_mul(global_channels_per_router)
			.and_then(|global_ports|global_ports.checked_add(1))
			.ok_or_else(||error!(bad_argument,"global_channels_per_router",&global_channels_per_router.to_string()))?;
		if routers_per_group.checked_mul(number_of_groups) != Some(num_routers)
		{
			return Err(error!(sizing_mismatch,num_routers,routers_per_group,number_of_groups));
		}
		Ok(DragonflySize{
			routers_per_group,
			global_channels_per_router,
			number_of_groups,
		})
	}
	pub fn routers_per_group(&self) -> usize
	{
		self.routers_per_group
	}
	pub fn global_channels_per_router(&self) -> usize
	{
		self.global_channels_per_router
	}
	pub fn number_of_groups(&self) -> usize
	{
		self.number_of_groups
	}
	pub fn num_routers(&self) -> usize
	{
		self.routers_per_group*self.number_of_groups
	}
	/**
	 Unpack a router index into `(group_offset, group_index)` coordinates.
	 With `group_offset` being the position of the router in the group and `group_index` the index of the group.
	**/
	pub fn unpack(&self, router:usize) -> (usize,usize)
	{
		(router%self.routers_per_group,router/self.routers_per_group)
	}
	/**
	 Pack coordinates `(group_offset, group_index)` into a whole router index.
	**/
	pub fn pack(&self, coordinates:(usize,usize)) -> usize
	{
		coordinates.0+coordinates.1*self.routers_per_group
	}
	pub fn group_of(&self, router:usize) -> usize
	{
		router/self.routers_per_group
	}
	/**
	Where the global port `port` of the router at `group_offset` in `group_index` goes.
	Returns `(target_group_index, target_group_offset, target_port)`.
	**/
	pub fn global_target(&self, group_index:usize, group_offset:usize, port:usize) -> (usize,usize,usize)
	{
		let g = self.number_of_groups;
		let h = self.global_channels_per_router;
		// group_offset*h+port+1 is in 1..g, so the target group is never the source group.
		let target_group = (group_index + group_offset*h + port + 1) % g;
		// gap is in 0..g-1
		let gap = (group_index + g - target_group - 1) % g;
		(target_group,gap/h,gap%h)
	}
	/**
	Where the local port `port` of the router at `group_offset` in `group_index` goes.
	Returns `(target_router, target_port)`, with `target_router` being a whole router index.
	**/
	pub fn local_target(&self, group_index:usize, group_offset:usize, port:usize) -> (usize,usize)
	{
		let a = self.routers_per_group;
		let router_out = self.pack((group_offset,group_index));
		let router_in = self.pack(((group_offset+port+1)%a,group_index));
		// Both routers in the same group, so router_out+a > router_in.
		let target_port = (router_out + a - router_in - 1) % a;
		(router_in,target_port)
	}
}

/**
Attach the endpoints to the routers.

With `N` endpoints and `R` routers, the endpoint `i<N-N%R` goes to router `i%R`, so that each router gets `N/R` of them. The last `N%R` endpoints go to router 0 if the `policy` admits them.
Link identifiers are given from 0 in the order of the endpoints.

Having endpoints but fewer than routers is an error.
**/
pub fn distribute_endpoints<E:Endpoint>(endpoints:&[E], num_routers:usize, latency:Time, policy:OverflowPolicy) -> Result<Vec<ExternalLink>,Error>
{
	let n = endpoints.len();
	if n==0
	{
		return Ok(vec![]);
	}
	if num_routers==0
	{
		return Err(error!(endpoint_shortage,n,num_routers));
	}
	let (endpoints_per_router,remainder) = (n/num_routers,n%num_routers);
	if endpoints_per_router==0
	{
		return Err(error!(endpoint_shortage,n,num_routers));
	}
	let distributed = n - remainder;
	debug!("distributing {} endpoints, {} per router, {} to router 0",n,endpoints_per_router,remainder);
	let mut links = Vec::with_capacity(n);
	for endpoint in 0..distributed
	{
		let (level,router) = (endpoint/num_routers,endpoint%num_routers);
		if level>=endpoints_per_router
		{
			return Err(error!(level_out_of_bound,endpoint,level,endpoints_per_router));
		}
		links.push(ExternalLink{
			link_id: links.len(),
			endpoint,
			router,
			latency,
		});
	}
	for (endpoint,node) in endpoints.iter().enumerate().skip(distributed)
	{
		let kind = node.kind();
		policy.admit(endpoint,kind)?;
		warn!("endpoint {} ({}) exceeds the uniform distribution, attaching it to router 0",endpoint,kind);
		links.push(ExternalLink{
			link_id: links.len(),
			endpoint,
			router: 0,
			latency,
		});
	}
	Ok(links)
}

/**
The links between groups, in order of group, offset in group, and global port.
Identifiers are given consecutively from `first_link_id`.
**/
pub fn global_links(size:DragonflySize, latency:Time, first_link_id:usize) -> Vec<InternalLink>
{
	let links:Vec<InternalLink> = iproduct!(0..size.number_of_groups,0..size.routers_per_group,0..size.global_channels_per_router)
		.enumerate()
		.map(|(offset,(group_index,group_offset,port))|{
			let (target_group,target_offset,target_port) = size.global_target(group_index,group_offset,port);
			InternalLink{
				link_id: first_link_id+offset,
				source: size.pack((group_offset,group_index)),
				destination: size.pack((target_offset,target_group)),
				source_outport: PortLabel::global(port),
				destination_inport: PortLabel::global(target_port),
				latency,
				weight: LinkClass::Global.weight(),
			}
		}).collect();
	debug!("generated {} global links from id {}",links.len(),first_link_id);
	links
}

/**
The links inside each group, in order of group, offset in group, and local port.
Identifiers are given consecutively from `first_link_id`.
A group of a single router has no local links.
**/
pub fn local_links(size:DragonflySize, latency:Time, first_link_id:usize) -> Vec<InternalLink>
{
	let a = size.routers_per_group;
	let links:Vec<InternalLink> = iproduct!(0..size.number_of_groups,0..a,0..a-1)
		.enumerate()
		.map(|(offset,(group_index,group_offset,port))|{
			let (target_router,target_port) = size.local_target(group_index,group_offset,port);
			InternalLink{
				link_id: first_link_id+offset,
				source: size.pack((group_offset,group_index)),
				destination: target_router,
				source_outport: PortLabel::local(port),
				destination_inport: PortLabel::local(target_port),
				latency,
				weight: LinkClass::Local.weight(),
			}
		}).collect();
	debug!("generated {} local links from id {}",links.len(),first_link_id);
	links
}
