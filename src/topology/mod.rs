/*!

A Topology is the static description of how routers, endpoints, and links are wired. It is what the builder hands to the host simulator.

Links between routers are of two classes. Local links join routers of the same group and global links join routers of different groups. Each router port is named by its class followed by an index, as `Local0` or `Global3`. The name of a port is unique among the ports of the same router in the same direction.

see [`dragonfly::Dragonfly`] for how a topology is built.

*/

pub mod dragonfly;

use std::collections::{BTreeMap,BTreeSet,VecDeque};
use std::fmt::{self,Display,Formatter};
use std::io::Write;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Serialize,Serializer};

use crate::matrix::Matrix;
use crate::error::{Error,PortDirection};
use crate::{error,Time};
use self::dragonfly::DragonflySize;

/// Some things most uses of the topology module will use.
pub mod prelude
{
	pub use super::{Topology,LinkClass,PortLabel,RouterDescriptor,ExternalLink,InternalLink,NeighbourRouterIteratorItem};
	pub use super::dragonfly::{Dragonfly,DragonflySize};
}

///The class of a link between routers.
///Local links have a lower weight, so that the routing tables complete the traversal of a group before taking another global link.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash,Serialize)]
pub enum LinkClass
{
	Local,
	Global,
}

impl LinkClass
{
	///Position of the class in per-class tables, such as the weights given to [Topology::bfs].
	pub fn index(self) -> usize
	{
		match self
		{
			LinkClass::Local => 0,
			LinkClass::Global => 1,
		}
	}
	///The routing weight given to the links of this class.
	pub fn weight(self) -> usize
	{
		match self
		{
			LinkClass::Local => 1,
			LinkClass::Global => 2,
		}
	}
	pub fn name(self) -> &'static str
	{
		match self
		{
			LinkClass::Local => "Local",
			LinkClass::Global => "Global",
		}
	}
}

///Name of a router port: a class and an index inside that class.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct PortLabel
{
	pub class: LinkClass,
	pub index: usize,
}

impl PortLabel
{
	pub fn local(index:usize) -> PortLabel
	{
		PortLabel{ class:LinkClass::Local, index }
	}
	pub fn global(index:usize) -> PortLabel
	{
		PortLabel{ class:LinkClass::Global, index }
	}
}

impl Display for PortLabel
{
	fn fmt(&self, f:&mut Formatter<'_>) -> fmt::Result
	{
		write!(f,"{}{}",self.class.name(),self.index)
	}
}

impl FromStr for PortLabel
{
	type Err = Error;
	fn from_str(s:&str) -> Result<PortLabel,Error>
	{
		for class in [LinkClass::Local,LinkClass::Global]
		{
			if let Some(digits) = s.strip_prefix(class.name())
			{
				if !digits.is_empty() && digits.bytes().all(|b|b.is_ascii_digit())
				{
					let index = digits.parse::<usize>().map_err(|_|error!(bad_argument,"port label",s))?;
					return Ok(PortLabel{class,index});
				}
			}
		}
		Err(error!(bad_argument,"port label",s))
	}
}

impl Serialize for PortLabel
{
	fn serialize<S:Serializer>(&self, serializer:S) -> Result<S::Ok,S::Error>
	{
		serializer.collect_str(self)
	}
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub struct RouterDescriptor
{
	pub router_id: usize,
	pub latency: Time,
}

///A link from an endpoint to a router.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub struct ExternalLink
{
	pub link_id: usize,
	///Position of the endpoint in the list given to the builder.
	pub endpoint: usize,
	pub router: usize,
	pub latency: Time,
}

///A unidirectional link between two routers.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub struct InternalLink
{
	pub link_id: usize,
	pub source: usize,
	pub destination: usize,
	///Port of `source` from which the link leaves.
	pub source_outport: PortLabel,
	///Port of `destination` into which the link arrives.
	pub destination_inport: PortLabel,
	pub latency: Time,
	pub weight: usize,
}

impl InternalLink
{
	pub fn class(&self) -> LinkClass
	{
		self.source_outport.class
	}
}

///Item for iterators of neighbour routers.
#[derive(Debug)]
pub struct NeighbourRouterIteratorItem
{
	///Port of the current router that goes to the neighbour.
	pub port: PortLabel,
	///Link class of the link to the neighbour router.
	pub link_class: LinkClass,
	///The index of the neighbour router.
	pub neighbour_router: usize,
	///The port of the neighbour router where the link arrives.
	pub neighbour_port: PortLabel,
	pub link_id: usize,
}

///How to dump a topology with [Topology::write_to_file].
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum ExportFormat
{
	///The `NODOS`/`GRADO` adjacency list format.
	Adjacency,
	///The whole topology, links included.
	Yaml,
}

impl FromStr for ExportFormat
{
	type Err = Error;
	fn from_str(s:&str) -> Result<ExportFormat,Error>
	{
		match s
		{
			"adjacency" | "adj" => Ok(ExportFormat::Adjacency),
			"yaml" => Ok(ExportFormat::Yaml),
			_ => Err(error!(bad_argument,"format",s)),
		}
	}
}

///A generated network: routers, the links to endpoints, and the links between routers.
#[derive(Clone,Debug,PartialEq,Eq,Serialize)]
pub struct Topology
{
	size: DragonflySize,
	routers: Vec<RouterDescriptor>,
	external_links: Vec<ExternalLink>,
	internal_links: Vec<InternalLink>,
	///`outgoing[r]` are the indices in `internal_links` of the links leaving router `r`.
	#[serde(skip)]
	outgoing: Vec<Vec<usize>>,
	///`incoming[r]` are the indices in `internal_links` of the links arriving to router `r`.
	#[serde(skip)]
	incoming: Vec<Vec<usize>>,
}

impl Topology
{
	///Index the links by router. Fails if a link names a router outside `routers`.
	pub fn new(size:DragonflySize, routers:Vec<RouterDescriptor>, external_links:Vec<ExternalLink>, internal_links:Vec<InternalLink>) -> Result<Topology,Error>
	{
		let n = routers.len();
		if let Some(link) = external_links.iter().find(|link|link.router>=n)
		{
			return Err(error!(router_out_of_range,link.link_id,link.router,n));
		}
		let mut outgoing = vec![vec![];n];
		let mut incoming = vec![vec![];n];
		for (index,link) in internal_links.iter().enumerate()
		{
			for router in [link.source,link.destination]
			{
				if router>=n
				{
					return Err(error!(router_out_of_range,link.link_id,router,n));
				}
			}
			outgoing[link.source].push(index);
			incoming[link.destination].push(index);
		}
		Ok(Topology{
			size,
			routers,
			external_links,
			internal_links,
			outgoing,
			incoming,
		})
	}
	pub fn size(&self) -> DragonflySize
	{
		self.size
	}
	pub fn num_routers(&self) -> usize
	{
		self.routers.len()
	}
	pub fn routers(&self) -> &[RouterDescriptor]
	{
		&self.routers
	}
	pub fn external_links(&self) -> &[ExternalLink]
	{
		&self.external_links
	}
	pub fn internal_links(&self) -> &[InternalLink]
	{
		&self.internal_links
	}
	///Number of links of any kind, which is also the next free link id.
	pub fn num_links(&self) -> usize
	{
		self.external_links.len() + self.internal_links.len()
	}
	pub fn links_of_class(&self, class:LinkClass) -> impl Iterator<Item=&InternalLink>
	{
		self.internal_links.iter().filter(move |link|link.class()==class)
	}
	///The external links attached to a router.
	pub fn endpoints_of(&self, router:usize) -> impl Iterator<Item=&ExternalLink>
	{
		self.external_links.iter().filter(move |link|link.router==router)
	}
	///The output ports of a router, by label.
	pub fn outports(&self, router:usize) -> BTreeMap<PortLabel,&InternalLink>
	{
		self.outgoing[router].iter().map(|&index|{
			let link = &self.internal_links[index];
			(link.source_outport,link)
		}).collect()
	}
	///The input ports of a router, by label.
	pub fn inports(&self, router:usize) -> BTreeMap<PortLabel,&InternalLink>
	{
		self.incoming[router].iter().map(|&index|{
			let link = &self.internal_links[index];
			(link.destination_inport,link)
		}).collect()
	}
	///Number of links leaving a router towards other routers.
	pub fn degree(&self, router:usize) -> usize
	{
		self.outgoing[router].len()
	}
	///Iterate over the routers reached from the output ports of `router`.
	pub fn neighbour_router_iter<'a>(&'a self, router:usize) -> impl Iterator<Item=NeighbourRouterIteratorItem> + 'a
	{
		self.outgoing[router].iter().map(move |&index|{
			let link = &self.internal_links[index];
			NeighbourRouterIteratorItem{
				port: link.source_outport,
				link_class: link.class(),
				neighbour_router: link.destination,
				neighbour_port: link.destination_inport,
				link_id: link.link_id,
			}
		})
	}

	/**
	Checks the invariants a dragonfly must hold, so that the host does not receive an ill-formed network even if the index arithmetic were to change.
	* Link ids are `0..num_links()`, external links first.
	* No link from a router to itself.
	* Global links join different groups.
	* Port labels are not repeated in a router, for each direction.
	* Each router has `global_channels_per_router` global ports and `routers_per_group-1` local ports in each direction.
	**/
	pub fn check_consistency(&self) -> Result<(),Error>
	{
		let ids = self.external_links.iter().map(|link|link.link_id).chain(self.internal_links.iter().map(|link|link.link_id));
		for (expected,found) in ids.enumerate()
		{
			if expected!=found
			{
				return Err(error!(link_id_gap,expected,found));
			}
		}
		for link in self.internal_links.iter()
		{
			if link.source==link.destination
			{
				return Err(error!(self_loop,link.link_id,link.source));
			}
			if link.class()==LinkClass::Global && self.size.group_of(link.source)==self.size.group_of(link.destination)
			{
				return Err(error!(intra_group_global_link,link.link_id,link.source,link.destination));
			}
		}
		for router in 0..self.num_routers()
		{
			let outgoing = self.outgoing[router].iter().map(|&index|self.internal_links[index].source_outport);
			check_router_ports(self.size,router,PortDirection::Outgoing,outgoing)?;
			let incoming = self.incoming[router].iter().map(|&index|self.internal_links[index].destination_inport);
			check_router_ports(self.size,router,PortDirection::Incoming,incoming)?;
		}
		Ok(())
	}

	///Breadth First Search to compute distances from a router to all others.
	///It may use weights per link class, skipping classes with weight `usize::MAX`. With weights it may give a non-minimal distance, since it is not Dijkstra.
	///Unreachable routers get `usize::MAX`.
	pub fn bfs(&self, origin:usize, class_weight:Option<&[usize]>) -> Vec<usize>
	{
		let n=self.num_routers();
		let mut distance=vec![usize::MAX;n];
		distance[origin]=0;
		let mut queue=VecDeque::with_capacity(n);
		queue.push_back(origin);
		while let Some(best)=queue.pop_front()
		{
			for NeighbourRouterIteratorItem{link_class,neighbour_router,..} in self.neighbour_router_iter(best)
			{
				let weight= if let Some(v)=class_weight
				{
					match v.get(link_class.index())
					{
						None | Some(&usize::MAX) => continue,
						Some(&x) => x,
					}
				}
				else
				{
					1
				};
				let alt=distance[best].saturating_add(weight);
				if alt<distance[neighbour_router]
				{
					distance[neighbour_router]=alt;
					queue.push_back(neighbour_router);
				}
			}
		}
		distance
	}
	///Hop distances between every pair of routers.
	pub fn distance_matrix(&self) -> Matrix<usize>
	{
		let n=self.num_routers();
		let mut matrix=Matrix::constant(0,n,n);
		for origin in 0..n
		{
			for (target,d) in self.bfs(origin,None).into_iter().enumerate()
			{
				*matrix.get_mut(origin,target)=d;
			}
		}
		matrix
	}
	///The greatest hop distance between two routers. `usize::MAX` if some router cannot be reached.
	pub fn diameter(&self) -> usize
	{
		let matrix = self.distance_matrix();
		matrix.outside_diagonal().copied().max().unwrap_or(0)
	}
	/// Find the components of the subtopology induced via the allowed link classes, indexed by [LinkClass::index].
	/// Returns vector `ret` with `ret[k]` containing the routers in the `k`-th component.
	pub fn components(&self, allowed_classes:&[bool]) -> Vec<Vec<usize>>
	{
		let mut r=vec![];
		let n=self.num_routers();
		let mut found=vec![false;n];
		let weights:Vec<usize>=allowed_classes.iter().map(|a|if *a{1}else {usize::MAX}).collect();
		for i in 0..n
		{
			if !found[i]
			{
				found[i]=true;
				let mut component=vec![i];
				let d=self.bfs(i,Some(&weights[..]));
				for j in 0..n
				{
					if i!=j && d[j]!=usize::MAX && !found[j]
					{
						component.push(j);
						found[j]=true;
					}
				}
				r.push(component);
			}
		}
		r
	}
	///For each ordered pair of groups count the number of global links from the first to the second.
	pub fn trunking_distribution(&self) -> Matrix<usize>
	{
		let groups = self.size.number_of_groups();
		let mut result = Matrix::constant(0,groups,groups);
		for link in self.links_of_class(LinkClass::Global)
		{
			*result.get_mut(self.size.group_of(link.source),self.size.group_of(link.destination))+=1;
		}
		result
	}
	///Dump the topology into a writer.
	pub fn write_to_file<W:Write>(&self, writer:&mut W, format:ExportFormat) -> Result<(),Error>
	{
		match format
		{
			ExportFormat::Adjacency => self.write_adjacencies(writer).map_err(|e|error!(could_not_write,e)),
			ExportFormat::Yaml => serde_yaml::to_writer(writer,self).map_err(|e|error!(could_not_serialize,e)),
		}
	}
	fn write_adjacencies<W:Write>(&self, writer:&mut W) -> std::io::Result<()>
	{
		let n=self.num_routers();
		writeln!(writer,"NODOS {}",n)?;
		writeln!(writer,"GRADO {}",(0..n).map(|router|self.degree(router)).max().unwrap_or(0))?;
		for router in 0..n
		{
			writeln!(writer,"N {}",router)?;
			writeln!(writer,"{}",self.neighbour_router_iter(router).map(|item|item.neighbour_router).join(" "))?;
		}
		Ok(())
	}
}

fn check_router_ports(size:DragonflySize, router:usize, direction:PortDirection, labels:impl Iterator<Item=PortLabel>) -> Result<(),Error>
{
	let mut seen = BTreeSet::new();
	let mut count = [0usize;2];
	for label in labels
	{
		if !seen.insert(label)
		{
			return Err(error!(duplicate_port,router,label.to_string(),direction));
		}
		count[label.class.index()]+=1;
	}
	for (class,expected) in [(LinkClass::Local,size.routers_per_group()-1),(LinkClass::Global,size.global_channels_per_router())]
	{
		let found = count[class.index()];
		if found!=expected
		{
			return Err(error!(degree_mismatch,router,class.name().to_string(),direction,found,expected));
		}
	}
	Ok(())
}
