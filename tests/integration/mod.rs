//! Integration tests driving the compiled tapship binary

mod helpers;

mod test_doctor;
mod test_formula;
mod test_init;
mod test_publish;
mod test_version;
