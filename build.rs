use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	// The default emitter falls back to idempotent placeholder values when git
	// metadata is unavailable (e.g. builds from a source tarball).
	Emitter::default()
		.add_instructions(&GitclBuilder::default().sha(true).build()?)?
		.add_instructions(&CargoBuilder::default().target_triple(true).build()?)?
		.emit()?;

	Ok(())
}
