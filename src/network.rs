/*!

Connects a built [Topology] with the objects of the host simulator.

The host decides what a router or a link is. The builder only tells it which ones to create and in which order: routers by index, then external links, then internal links, both by link id. Nothing is created when the topology fails to build.

*/

use log::debug;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::topology::prelude::*;

/// The constructors offered by a host simulator.
pub trait HostNetwork
{
	type Node: Endpoint;
	type Router;
	type ExtLink;
	type IntLink;
	fn make_router(&mut self, descriptor:&RouterDescriptor) -> Self::Router;
	fn make_external_link(&mut self, descriptor:&ExternalLink, node:&Self::Node, router:&Self::Router) -> Self::ExtLink;
	fn make_internal_link(&mut self, descriptor:&InternalLink, source:&Self::Router, destination:&Self::Router) -> Self::IntLink;
	/// Receives every created object, indexed as in the topology.
	fn attach(&mut self, routers:Vec<Self::Router>, external_links:Vec<Self::ExtLink>, internal_links:Vec<Self::IntLink>);
}

/// Build the dragonfly for `nodes` and have `host` create its objects.
pub fn make_topology<H:HostNetwork>(dragonfly:&Dragonfly, nodes:&[H::Node], host:&mut H) -> Result<Topology,Error>
{
	let topology = dragonfly.build(nodes)?;
	let routers:Vec<H::Router> = topology.routers().iter().map(|descriptor|host.make_router(descriptor)).collect();
	let external_links:Vec<H::ExtLink> = topology.external_links().iter().map(|descriptor|
		host.make_external_link(descriptor,&nodes[descriptor.endpoint],&routers[descriptor.router])
	).collect();
	let internal_links:Vec<H::IntLink> = topology.internal_links().iter().map(|descriptor|
		host.make_internal_link(descriptor,&routers[descriptor.source],&routers[descriptor.destination])
	).collect();
	debug!("attaching {} routers and {} links to the host",routers.len(),topology.num_links());
	host.attach(routers,external_links,internal_links);
	Ok(topology)
}
