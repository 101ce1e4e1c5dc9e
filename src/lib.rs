pub mod ctl;
pub mod dispatch;
pub mod net;
pub mod topo;

#[cfg(test)]
mod test;
