/*!
Command handlers for the CLI

- `zone`: Resolve an instance name and print its zone info
- `invoke`: Build a method call from arguments, send it and print the body
*/

// Zone lookup command
pub mod zone;

// One-shot method invocation command
pub mod invoke;
