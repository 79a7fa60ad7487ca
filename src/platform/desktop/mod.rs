pub mod save_dialog;
