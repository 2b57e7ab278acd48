// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(all(not(debug_assertions), feature = "desktop"), windows_subsystem = "windows")]

fn main() {
    scancube_lib::run()
}
