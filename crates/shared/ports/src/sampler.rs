/// Port for the random draws that shape a student's demand
///
/// Implementations decide the distributions; the engine only decides when
/// each draw happens.
pub trait DemandSampler {
    /// Session in which the student starts working, in `0..num_sessions`
    fn start_session(&mut self, num_sessions: usize) -> usize;

    /// Minutes the student needs in one session (non-negative)
    fn service_time(&mut self) -> f64;

    /// Amplitude of the utility curve for the given session
    fn utility_scale(&mut self, session_offset: usize) -> f64;
}
