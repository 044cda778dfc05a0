/*!

The endpoints attached to the routers: the cache, directory, and DMA controllers of the simulated system.

The builder never inspects an endpoint beyond its [EndpointKind], which is only consulted when some endpoints exceed the uniform distribution. See [OverflowPolicy](crate::config::OverflowPolicy).

*/

use std::fmt::{self,Display,Formatter};
use serde::{Serialize,Deserialize};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum EndpointKind
{
	Cache,
	Directory,
	Dma,
	Other,
}

impl Display for EndpointKind
{
	fn fmt(&self, f:&mut Formatter<'_>) -> fmt::Result
	{
		let name = match self
		{
			EndpointKind::Cache => "Cache",
			EndpointKind::Directory => "Directory",
			EndpointKind::Dma => "DMA",
			EndpointKind::Other => "Other",
		};
		write!(f,"{}",name)
	}
}

/// Anything the host framework can attach to a router port.
pub trait Endpoint
{
	fn kind(&self) -> EndpointKind;
}

/// A plain controller description. This is what the `dragonfly` binary builds from its options.
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct Controller
{
	pub name: String,
	pub kind: EndpointKind,
}

impl Controller
{
	pub fn new(kind:EndpointKind, index:usize) -> Controller
	{
		let prefix = match kind
		{
			EndpointKind::Cache => "l1_cntrl",
			EndpointKind::Directory => "dir_cntrl",
			EndpointKind::Dma => "dma_cntrl",
			EndpointKind::Other => "cntrl",
		};
		Controller{
			name: format!("{}{}",prefix,index),
			kind,
		}
	}
}

impl Endpoint for Controller
{
	fn kind(&self) -> EndpointKind
	{
		self.kind
	}
}

impl<E:Endpoint+?Sized> Endpoint for &E
{
	fn kind(&self) -> EndpointKind
	{
		(**self).kind()
	}
}

impl Endpoint for EndpointKind
{
	fn kind(&self) -> EndpointKind
	{
		*self
	}
}
