//! Render timing: an overall wall-clock timer and the per-document
//! render-time emitter.

pub mod emit;
pub mod timer;

pub use emit::{
    emit_render_times, find_tmp_files, output_file_name, parent_dirs, tmp_file_name, EmitReport,
    RenderTimes,
};
pub use timer::{elapsed_seconds, start_timer, timer_path, TIMER_FILE};
