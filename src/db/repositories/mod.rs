mod focus_sessions;
