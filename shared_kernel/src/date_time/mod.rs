pub mod time_window;
