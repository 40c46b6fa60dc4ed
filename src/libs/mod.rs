pub mod io;
pub mod outgroup;
pub mod phylo;
