mod event_loop;
mod frame;
mod shortest_path;
