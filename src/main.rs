use std::env;

use env_logger::Env;

fn main()
{
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
	let args:Vec<String> = env::args().collect();
	if let Err(error) = dragonfly_lib::terminal_main(&args)
	{
		eprintln!("dragonfly failed: {}",error);
		std::process::exit(-1);
	}
}
