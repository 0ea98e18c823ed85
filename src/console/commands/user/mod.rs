mod set_role;

pub use set_role::SetRoleCommand;
