/*!

Errors raised while building a dragonfly. All of them are configuration-consistency errors: the build is aborted and no partial topology is returned.

Errors are created with the [error!](crate::error!) macro, which records where the error has been raised.
```ignore
return Err(error!(sizing_mismatch,num_routers,routers_per_group,number_of_groups).with_message(format!("while building from {}",filename)));
```

*/

use std::fmt::{self,Display,Formatter};
use std::path::PathBuf;

/// A point in the source code.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

impl Display for SourceLocation
{
	fn fmt(&self, f:&mut Formatter<'_>) -> fmt::Result
	{
		write!(f,"{}:{}:{}",self.file,self.line,self.column)
	}
}

/// Builds the [SourceLocation] of the place where it is invoked.
#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	};
}

/// `error!(kind,args...)` calls the constructor `Error::kind(source_location!(),args...)`.
#[macro_export]
macro_rules! error{
	($kind:ident) => {{
		$crate::error::Error::$kind( $crate::source_location!() )
	}};
	($kind:ident, $($args:expr),* $(,)?) => {{
		$crate::error::Error::$kind( $crate::source_location!(), $($args),* )
	}};
}

/// Whether a port is at the sending or at the receiving end of a link.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum PortDirection
{
	Outgoing,
	Incoming,
}

impl Display for PortDirection
{
	fn fmt(&self, f:&mut Formatter<'_>) -> fmt::Result
	{
		match self
		{
			PortDirection::Outgoing => write!(f,"outgoing"),
			PortDirection::Incoming => write!(f,"incoming"),
		}
	}
}

#[derive(Debug,thiserror::Error)]
pub enum ErrorKind
{
	#[error("{routers_per_group} routers per group times {number_of_groups} groups does not match the {num_routers} routers requested")]
	SizingMismatch{
		num_routers: usize,
		routers_per_group: usize,
		number_of_groups: usize,
	},
	#[error("a dragonfly group must contain at least one router")]
	EmptyGroup,
	#[error("there are {endpoints} endpoints for {routers} routers, at least one endpoint per router is required")]
	EndpointShortage{
		endpoints: usize,
		routers: usize,
	},
	#[error("endpoint {endpoint} would be at level {level} of its router, but only {bound} levels are available")]
	LevelOutOfBound{
		endpoint: usize,
		level: usize,
		bound: usize,
	},
	#[error("endpoint {endpoint} of kind {kind} exceeds the uniform distribution and the overflow policy does not accept it")]
	OverflowRejected{
		endpoint: usize,
		kind: String,
	},
	#[error("router {router} has a repeated {direction} port {port}")]
	DuplicatePort{
		router: usize,
		port: String,
		direction: PortDirection,
	},
	#[error("router {router} has {found} {direction} {class} ports, expected {expected}")]
	DegreeMismatch{
		router: usize,
		class: String,
		direction: PortDirection,
		found: usize,
		expected: usize,
	},
	#[error("link {link_id} joins router {router} with itself")]
	SelfLoop{
		link_id: usize,
		router: usize,
	},
	#[error("global link {link_id} joins routers {source_router} and {destination_router} of the same group")]
	IntraGroupGlobalLink{
		link_id: usize,
		source_router: usize,
		destination_router: usize,
	},
	#[error("link {link_id} names router {router}, but there are only {num_routers} routers")]
	RouterOutOfRange{
		link_id: usize,
		router: usize,
		num_routers: usize,
	},
	#[error("link id {found} found where {expected} was expected")]
	LinkIdGap{
		expected: usize,
		found: usize,
	},
	#[error("there were no {0}")]
	MissingParameter(&'static str),
	#[error("bad value for {name}: {value}")]
	BadArgument{
		name: String,
		value: String,
	},
	#[error("could not open file {filename}")]
	CouldNotOpenFile{
		filename: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("could not parse the options")]
	IllFormedConfiguration(#[source] serde_yaml::Error),
	#[error("could not write the output")]
	CouldNotWrite(#[source] std::io::Error),
	#[error("could not serialize the topology")]
	CouldNotSerialize(#[source] serde_yaml::Error),
}

/// The error type of the crate. The kind plus where it was raised and any context added while propagating it.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub messages: Vec<String>,
}

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			messages: vec![],
		}
	}
	/// Append some context.
	pub fn with_message(mut self, message:String) -> Error
	{
		self.messages.push(message);
		self
	}
	pub fn sizing_mismatch(source_location:SourceLocation, num_routers:usize, routers_per_group:usize, number_of_groups:usize) -> Error
	{
		Error::new(source_location,ErrorKind::SizingMismatch{num_routers,routers_per_group,number_of_groups})
	}
	pub fn empty_group(source_location:SourceLocation) -> Error
	{
		Error::new(source_location,ErrorKind::EmptyGroup)
	}
	pub fn endpoint_shortage(source_location:SourceLocation, endpoints:usize, routers:usize) -> Error
	{
		Error::new(source_location,ErrorKind::EndpointShortage{endpoints,routers})
	}
	pub fn level_out_of_bound(source_location:SourceLocation, endpoint:usize, level:usize, bound:usize) -> Error
	{
		Error::new(source_location,ErrorKind::LevelOutOfBound{endpoint,level,bound})
	}
	pub fn overflow_rejected(source_location:SourceLocation, endpoint:usize, kind:String) -> Error
	{
		Error::new(source_location,ErrorKind::OverflowRejected{endpoint,kind})
	}
	pub fn duplicate_port(source_location:SourceLocation, router:usize, port:String, direction:PortDirection) -> Error
	{
		Error::new(source_location,ErrorKind::DuplicatePort{router,port,direction})
	}
	pub fn degree_mismatch(source_location:SourceLocation, router:usize, class:String, direction:PortDirection, found:usize, expected:usize) -> Error
	{
		Error::new(source_location,ErrorKind::DegreeMismatch{router,class,direction,found,expected})
	}
	pub fn self_loop(source_location:SourceLocation, link_id:usize, router:usize) -> Error
	{
		Error::new(source_location,ErrorKind::SelfLoop{link_id,router})
	}
	pub fn intra_group_global_link(source_location:SourceLocation, link_id:usize, source_router:usize, destination_router:usize) -> Error
	{
		Error::new(source_location,ErrorKind::IntraGroupGlobalLink{link_id,source_router,destination_router})
	}
	pub fn router_out_of_range(source_location:SourceLocation, link_id:usize, router:usize, num_routers:usize) -> Error
	{
		Error::new(source_location,ErrorKind::RouterOutOfRange{link_id,router,num_routers})
	}
	pub fn link_id_gap(source_location:SourceLocation, expected:usize, found:usize) -> Error
	{
		Error::new(source_location,ErrorKind::LinkIdGap{expected,found})
	}
	pub fn missing_parameter(source_location:SourceLocation, name:&'static str) -> Error
	{
		Error::new(source_location,ErrorKind::MissingParameter(name))
	}
	pub fn bad_argument(source_location:SourceLocation, name:&str, value:&str) -> Error
	{
		Error::new(source_location,ErrorKind::BadArgument{name:name.to_string(),value:value.to_string()})
	}
	pub fn could_not_open_file(source_location:SourceLocation, filename:PathBuf, source:std::io::Error) -> Error
	{
		Error::new(source_location,ErrorKind::CouldNotOpenFile{filename,source})
	}
	pub fn ill_formed_configuration(source_location:SourceLocation, source:serde_yaml::Error) -> Error
	{
		Error::new(source_location,ErrorKind::IllFormedConfiguration(source))
	}
	pub fn could_not_write(source_location:SourceLocation, source:std::io::Error) -> Error
	{
		Error::new(source_location,ErrorKind::CouldNotWrite(source))
	}
	pub fn could_not_serialize(source_location:SourceLocation, source:serde_yaml::Error) -> Error
	{
		Error::new(source_location,ErrorKind::CouldNotSerialize(source))
	}
}

impl Display for Error
{
	fn fmt(&self, f:&mut Formatter<'_>) -> fmt::Result
	{
		write!(f,"{} (raised at {})",self.kind,self.source_location)?;
		for message in self.messages.iter()
		{
			write!(f,"\n\t{}",message)?;
		}
		Ok(())
	}
}

impl std::error::Error for Error
{
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
	{
		Some(&self.kind)
	}
}
