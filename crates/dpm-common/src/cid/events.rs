//! Static Contact-ID event table (SIA DC-05 event codes as reported by
//! Ademco/Honeywell Vista panels).

/// Event category, the first column of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Medical,
    Fire,
    Panic,
    Burglar,
    GeneralAlarm,
    NonBurglary24h,
    FireSupervisory,
    SystemTrouble,
    SounderRelayTrouble,
    PeripheralTrouble,
    CommunicationTrouble,
    ProtectionLoop,
    SensorTrouble,
    OpenClose,
    RemoteAccess,
    AccessControl,
    SystemDisable,
    SounderRelayDisable,
    PeripheralDisable,
    CommunicationDisable,
    Bypass,
    TestMisc,
    EventLog,
    Scheduling,
    PersonnelMonitoring,
    Miscellaneous,
    Customized,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Medical => "Medical Alarms",
            Category::Fire => "Fire Alarms",
            Category::Panic => "Panic Alarms",
            Category::Burglar => "Burglar Alarms",
            Category::GeneralAlarm => "General Alarm",
            Category::NonBurglary24h => "24 Hour Non-Burglary",
            Category::FireSupervisory => "Fire Supervisory",
            Category::SystemTrouble => "System Troubles",
            Category::SounderRelayTrouble => "Sounder/Relay Trouble",
            Category::PeripheralTrouble => "System Peripheral Trouble",
            Category::CommunicationTrouble => "Communication Troubles",
            Category::ProtectionLoop => "Protection Loop",
            Category::SensorTrouble => "Sensor Trouble",
            Category::OpenClose => "Open/Close",
            Category::RemoteAccess => "Remote Access",
            Category::AccessControl => "Access Control",
            Category::SystemDisable => "System Disables",
            Category::SounderRelayDisable => "Sounder/Relay Disables",
            Category::PeripheralDisable => "System Peripheral Disables",
            Category::CommunicationDisable => "Communication Disables",
            Category::Bypass => "Bypasses",
            Category::TestMisc => "Test/Miscellaneous",
            Category::EventLog => "Event Log",
            Category::Scheduling => "Scheduling",
            Category::PersonnelMonitoring => "Personnel Monitoring",
            Category::Miscellaneous => "Miscellaneous",
            Category::Customized => "Customized",
        }
    }
}

/// What the 3-digit agent field of a code refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    User,
    Zone,
    /// Raw identifier with no name table.
    Id,
    /// Installer-assigned codes (750..=789).
    Custom,
}

/// Selects the wording used for the qualifier digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifierSet {
    Alarm,
    OpenClose,
    StartEnd,
    Activation,
}

impl QualifierSet {
    /// Qualifier digit to text. Only `1`, `3` and `6` are defined.
    pub fn describe(self, qualifier: char) -> Option<&'static str> {
        let text = match (self, qualifier) {
            (_, '6') => "Duplicate message",
            (QualifierSet::Alarm, '1') => "New event",
            (QualifierSet::Alarm, '3') => "Restore event",
            (QualifierSet::OpenClose, '1') => "Open event",
            (QualifierSet::OpenClose, '3') => "Close event",
            (QualifierSet::StartEnd, '1') => "Start event",
            (QualifierSet::StartEnd, '3') => "End event",
            (QualifierSet::Activation, '1') => "Activation event",
            (QualifierSet::Activation, '3') => "Deactivation event",
            _ => return None,
        };
        Some(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    pub code: u16,
    pub category: Category,
    pub description: &'static str,
    pub agent: AgentKind,
    pub qualifiers: QualifierSet,
}

const fn ev(
    code: u16,
    category: Category,
    description: &'static str,
    agent: AgentKind,
    qualifiers: QualifierSet,
) -> EventSpec {
    EventSpec {
        code,
        category,
        description,
        agent,
        qualifiers,
    }
}

const CUSTOM_RANGE: std::ops::RangeInclusive<u16> = 750..=789;

const CUSTOM: EventSpec = ev(
    0,
    Category::Customized,
    "Assign Your Own Description",
    AgentKind::Custom,
    QualifierSet::Alarm,
);

/// Look up an event code. Installer-assigned codes share one generic entry.
pub fn lookup(code: u16) -> Option<EventSpec> {
    if CUSTOM_RANGE.contains(&code) {
        return Some(EventSpec { code, ..CUSTOM });
    }
    EVENTS
        .binary_search_by_key(&code, |e| e.code)
        .ok()
        .map(|i| EVENTS[i])
}

use AgentKind::*;
use Category::*;
use QualifierSet::{Alarm, OpenClose as OC};

// Sorted by code; `lookup` binary-searches it.
#[rustfmt::skip]
static EVENTS: &[EventSpec] = &[
    ev(100, Medical, "Medical Emergency", Zone, Alarm),
    ev(101, Medical, "Pendant Transmitter", Zone, Alarm),
    ev(102, Medical, "Failed to report in", Zone, Alarm),
    ev(110, Fire, "Fire", Zone, Alarm),
    ev(111, Fire, "Smoke", Zone, Alarm),
    ev(112, Fire, "Combustion", Zone, Alarm),
    ev(113, Fire, "Water flow", Zone, Alarm),
    ev(114, Fire, "Heat", Zone, Alarm),
    ev(115, Fire, "Pull Station", Zone, Alarm),
    ev(116, Fire, "Duct", Zone, Alarm),
    ev(117, Fire, "Flame", Zone, Alarm),
    ev(118, Fire, "Near Alarm", Zone, Alarm),
    ev(120, Panic, "Panic", Zone, Alarm),
    ev(121, Panic, "Duress", User, Alarm),
    ev(122, Panic, "Silent", Zone, Alarm),
    ev(123, Panic, "Audible", Zone, Alarm),
    ev(124, Panic, "Duress-Access granted", Zone, Alarm),
    ev(125, Panic, "Duress-Egress granted", Zone, Alarm),
    ev(126, Panic, "Hold-up suspicion print", User, Alarm),
    ev(130, Burglar, "Burglary", Zone, Alarm),
    ev(131, Burglar, "Perimeter", Zone, Alarm),
    ev(132, Burglar, "Interior", Zone, Alarm),
    ev(133, Burglar, "24 Hour burglary", Zone, Alarm),
    ev(134, Burglar, "Entry/Exit", Zone, Alarm),
    ev(135, Burglar, "Day/Night", Zone, Alarm),
    ev(136, Burglar, "Outdoor", Zone, Alarm),
    ev(137, Burglar, "Tamper", Zone, Alarm),
    ev(138, Burglar, "Near alarm", Zone, Alarm),
    ev(139, Burglar, "Intrusion Verifier", Zone, Alarm),
    ev(140, GeneralAlarm, "General Alarm", Zone, Alarm),
    ev(141, GeneralAlarm, "Polling loop open", Zone, Alarm),
    ev(142, GeneralAlarm, "Polling loop short", Zone, Alarm),
    ev(143, GeneralAlarm, "Expansion module failure", Zone, Alarm),
    ev(144, GeneralAlarm, "Sensor tamper", Zone, Alarm),
    ev(145, GeneralAlarm, "Expansion module tamper", Zone, Alarm),
    ev(146, GeneralAlarm, "Silent Burglary", Zone, Alarm),
    ev(147, GeneralAlarm, "Sensor Supervision Failure", Zone, Alarm),
    ev(150, NonBurglary24h, "24 Hour Non-Burglary", Zone, Alarm),
    ev(151, NonBurglary24h, "Gas detected", Zone, Alarm),
    ev(152, NonBurglary24h, "Refrigeration", Zone, Alarm),
    ev(153, NonBurglary24h, "Loss of heat", Zone, Alarm),
    ev(154, NonBurglary24h, "Water Leakage", Zone, Alarm),
    ev(155, NonBurglary24h, "Foil Break", Zone, Alarm),
    ev(156, NonBurglary24h, "Day Trouble", Zone, Alarm),
    ev(157, NonBurglary24h, "Low bottled gas level", Zone, Alarm),
    ev(158, NonBurglary24h, "High temp", Zone, Alarm),
    ev(159, NonBurglary24h, "Low temp", Zone, Alarm),
    ev(161, NonBurglary24h, "Loss of air flow", Zone, Alarm),
    ev(162, NonBurglary24h, "Carbon Monoxide detected", Zone, Alarm),
    ev(163, NonBurglary24h, "Tank level", Zone, Alarm),
    ev(168, NonBurglary24h, "High Humidity", Zone, Alarm),
    ev(169, NonBurglary24h, "Low Humidity", Zone, Alarm),
    ev(200, FireSupervisory, "Fire Supervisory", Zone, Alarm),
    ev(201, FireSupervisory, "Low water pressure", Zone, Alarm),
    ev(202, FireSupervisory, "Low CO2", Zone, Alarm),
    ev(203, FireSupervisory, "Gate valve sensor", Zone, Alarm),
    ev(204, FireSupervisory, "Low water level", Zone, Alarm),
    ev(205, FireSupervisory, "Pump activated", Zone, Alarm),
    ev(206, FireSupervisory, "Pump failure", Zone, Alarm),
    ev(300, SystemTrouble, "System Trouble", Zone, Alarm),
    ev(301, SystemTrouble, "AC Loss", Zone, Alarm),
    ev(302, SystemTrouble, "Low system battery", Zone, Alarm),
    ev(303, SystemTrouble, "RAM Checksum bad", Zone, Alarm),
    ev(304, SystemTrouble, "ROM checksum bad", Zone, Alarm),
    ev(305, SystemTrouble, "System reset", Zone, Alarm),
    ev(306, SystemTrouble, "Panel programming changed", Zone, Alarm),
    ev(307, SystemTrouble, "Self-test failure", Zone, Alarm),
    ev(308, SystemTrouble, "System shutdown", Zone, Alarm),
    ev(309, SystemTrouble, "Battery test failure", Zone, Alarm),
    ev(310, SystemTrouble, "Ground fault", Zone, Alarm),
    ev(311, SystemTrouble, "Battery Missing/Dead", Zone, Alarm),
    ev(312, SystemTrouble, "Power Supply Overcurrent", Zone, Alarm),
    ev(313, SystemTrouble, "Engineer Reset", User, Alarm),
    ev(314, SystemTrouble, "Primary Power Supply Failure", Zone, Alarm),
    ev(316, SystemTrouble, "System Tamper", Id, Alarm),
    ev(320, SounderRelayTrouble, "Sounder/Relay", Zone, Alarm),
    ev(321, SounderRelayTrouble, "Bell 1", Zone, Alarm),
    ev(322, SounderRelayTrouble, "Bell 2", Zone, Alarm),
    ev(323, SounderRelayTrouble, "Alarm relay", Zone, Alarm),
    ev(324, SounderRelayTrouble, "Trouble relay", Zone, Alarm),
    ev(325, SounderRelayTrouble, "Reversing relay", Zone, Alarm),
    ev(326, SounderRelayTrouble, "Notification Appliance Ckt. #3", Zone, Alarm),
    ev(327, SounderRelayTrouble, "Notification Appliance Ckt. #4", Zone, Alarm),
    ev(330, PeripheralTrouble, "System Peripheral trouble", Zone, Alarm),
    ev(331, PeripheralTrouble, "Polling loop open", Zone, Alarm),
    ev(332, PeripheralTrouble, "Polling loop short", Zone, Alarm),
    ev(333, PeripheralTrouble, "Expansion module failure", Zone, Alarm),
    ev(334, PeripheralTrouble, "Repeater failure", Zone, Alarm),
    ev(335, PeripheralTrouble, "Local printer out of paper", Zone, Alarm),
    ev(336, PeripheralTrouble, "Local printer failure", Zone, Alarm),
    ev(337, PeripheralTrouble, "Exp. Module DC Loss", Zone, Alarm),
    ev(338, PeripheralTrouble, "Exp. Module Low Battery", Zone, Alarm),
    ev(339, PeripheralTrouble, "Exp. Module Reset", Zone, Alarm),
    ev(341, PeripheralTrouble, "Exp. Module Tamper", Zone, Alarm),
    ev(342, PeripheralTrouble, "Exp. Module AC Loss", Zone, Alarm),
    ev(343, PeripheralTrouble, "Exp. Module self-test fail", Zone, Alarm),
    ev(344, PeripheralTrouble, "RF Receiver Jam Detect", Zone, Alarm),
    ev(345, PeripheralTrouble, "AES Encryption disabled/enabled", Zone, Alarm),
    ev(350, CommunicationTrouble, "Communication trouble", Zone, Alarm),
    ev(351, CommunicationTrouble, "Telco 1 fault", Zone, Alarm),
    ev(352, CommunicationTrouble, "Telco 2 fault", Zone, Alarm),
    ev(353, CommunicationTrouble, "Long Range Radio xmitter fault", Zone, Alarm),
    ev(354, CommunicationTrouble, "Failure to communicate event", Zone, Alarm),
    ev(355, CommunicationTrouble, "Loss of Radio supervision", Zone, Alarm),
    ev(356, CommunicationTrouble, "Loss of central polling", Zone, Alarm),
    ev(357, CommunicationTrouble, "Long Range Radio Transmitter VSWR", Zone, Alarm),
    ev(370, ProtectionLoop, "Protection loop", Zone, Alarm),
    ev(371, ProtectionLoop, "Protection loop open", Zone, Alarm),
    ev(372, ProtectionLoop, "Protection loop short", Zone, Alarm),
    ev(373, ProtectionLoop, "Fire trouble", Zone, Alarm),
    ev(374, ProtectionLoop, "Exit error by User", Zone, Alarm),
    ev(375, ProtectionLoop, "Panic zone trouble", Zone, Alarm),
    ev(376, ProtectionLoop, "Hold-up zone trouble", Zone, Alarm),
    ev(377, ProtectionLoop, "Swinger Trouble", Zone, Alarm),
    ev(378, ProtectionLoop, "Cross-zone Trouble", Zone, Alarm),
    ev(380, SensorTrouble, "Sensor trouble global", Zone, Alarm),
    ev(381, SensorTrouble, "Loss of supervision - RF", Zone, Alarm),
    ev(382, SensorTrouble, "Loss of supervision - RPM", Zone, Alarm),
    ev(383, SensorTrouble, "Sensor tamper", Zone, Alarm),
    ev(384, SensorTrouble, "RF low battery", Zone, Alarm),
    ev(385, SensorTrouble, "Smoke detector Hi sensitivity", Zone, Alarm),
    ev(386, SensorTrouble, "Smoke detector Low sensitivity", Zone, Alarm),
    ev(387, SensorTrouble, "Intrusion detector Hi sensitivity", Zone, Alarm),
    ev(388, SensorTrouble, "Intrusion detector Low sensitivity", Zone, Alarm),
    ev(389, SensorTrouble, "Sensor self-test failure", Zone, Alarm),
    ev(391, SensorTrouble, "Sensor Watch failure", Zone, Alarm),
    ev(392, SensorTrouble, "Drift Compensation Error", Zone, Alarm),
    ev(393, SensorTrouble, "Maintenance Alert", Zone, Alarm),
    ev(400, OpenClose, "Open/Close", User, OC),
    ev(401, OpenClose, "Open/Close by User", User, OC),
    ev(402, OpenClose, "Group Open/Close", User, OC),
    ev(403, OpenClose, "Automatic Open/Close", User, OC),
    ev(404, OpenClose, "Late to O/C (Note: use 453, 454 instead)", User, OC),
    ev(405, OpenClose, "Deferred O/C (Obsolete - do not use)", User, OC),
    ev(406, OpenClose, "Cancel (by User)", User, OC),
    ev(407, OpenClose, "Remote arm/disarm", User, OC),
    ev(408, OpenClose, "Quick arm", User, OC),
    ev(409, OpenClose, "Keyswitch Open/Close", User, OC),
    ev(411, RemoteAccess, "Callback requested", User, Alarm),
    ev(412, RemoteAccess, "Successful download access", User, Alarm),
    ev(413, RemoteAccess, "Unsuccessful access", User, Alarm),
    ev(414, RemoteAccess, "System shutdown command received", User, Alarm),
    ev(415, RemoteAccess, "Dialer shutdown command received", User, Alarm),
    ev(416, RemoteAccess, "Successful Upload", Zone, Alarm),
    ev(421, AccessControl, "Access denied", User, Alarm),
    ev(422, AccessControl, "Access report by User", User, Alarm),
    ev(423, AccessControl, "Forced Access", Zone, Alarm),
    ev(424, AccessControl, "Egress Denied", User, Alarm),
    ev(425, AccessControl, "Egress Granted", User, Alarm),
    ev(426, AccessControl, "Access Door propped open", Zone, Alarm),
    ev(427, AccessControl, "Access point Door Status Monitor trouble", Zone, Alarm),
    ev(428, AccessControl, "Access point Request To Exit trouble", Zone, Alarm),
    ev(429, AccessControl, "Access program mode entry", User, Alarm),
    ev(430, AccessControl, "Access program mode exit", User, Alarm),
    ev(431, AccessControl, "Access threat level change", User, Alarm),
    ev(432, AccessControl, "Access relay/trigger fail", Zone, Alarm),
    ev(433, AccessControl, "Access Request to Exit shunt", Zone, Alarm),
    ev(434, AccessControl, "Access Door Status Monitor shunt", Zone, Alarm),
    ev(435, AccessControl, "Second Person Access", User, Alarm),
    ev(436, AccessControl, "Irregular Access", User, Alarm),
    ev(441, OpenClose, "Armed Stay", User, OC),
    ev(442, OpenClose, "Keyswitch Armed Stay", User, OC),
    ev(450, OpenClose, "Exception Open/Close", User, OC),
    ev(451, OpenClose, "Early Open/Close", User, OC),
    ev(452, OpenClose, "Late Open/Close", User, OC),
    ev(453, OpenClose, "Failed to Open", User, OC),
    ev(454, OpenClose, "Failed to Close", User, OC),
    ev(455, OpenClose, "Auto-arm Failed", User, OC),
    ev(456, OpenClose, "Partial Arm", User, OC),
    ev(457, OpenClose, "User Exit Error", User, OC),
    ev(458, OpenClose, "User on Premises", User, OC),
    ev(459, OpenClose, "Recent Close", User, OC),
    ev(461, OpenClose, "Wrong Code Entry", Zone, OC),
    ev(462, OpenClose, "Legal Code Entry", User, OC),
    ev(463, OpenClose, "Re-arm after Alarm", User, OC),
    ev(464, OpenClose, "Auto-arm Time Extended", User, OC),
    ev(465, OpenClose, "Panic Alarm Reset", Zone, OC),
    ev(466, OpenClose, "Service On/Off Premises", User, OC),
    ev(501, SystemDisable, "Access reader disable", Zone, Alarm),
    ev(520, SounderRelayDisable, "Sounder/Relay Disable", Zone, Alarm),
    ev(521, SounderRelayDisable, "Bell 1 disable", Zone, Alarm),
    ev(522, SounderRelayDisable, "Bell 2 disable", Zone, Alarm),
    ev(523, SounderRelayDisable, "Alarm relay disable", Zone, Alarm),
    ev(524, SounderRelayDisable, "Trouble relay disable", Zone, Alarm),
    ev(525, SounderRelayDisable, "Reversing relay disable", Zone, Alarm),
    ev(526, SounderRelayDisable, "Notification Appliance Ckt. # 3 disable", Zone, Alarm),
    ev(527, SounderRelayDisable, "Notification Appliance Ckt. # 4 disable", Zone, Alarm),
    ev(531, PeripheralDisable, "Module Added", Zone, Alarm),
    ev(532, PeripheralDisable, "Module Removed", Zone, Alarm),
    ev(551, CommunicationDisable, "Dialer disabled", Zone, Alarm),
    ev(552, CommunicationDisable, "Radio transmitter disabled", Zone, Alarm),
    ev(553, CommunicationDisable, "Remote Upload/Download disabled", Zone, Alarm),
    ev(570, Bypass, "Zone/Sensor bypass", Zone, Alarm),
    ev(571, Bypass, "Fire bypass", Zone, Alarm),
    ev(572, Bypass, "24 Hour zone bypass", Zone, Alarm),
    ev(573, Bypass, "Burglary Bypass", Zone, Alarm),
    ev(574, Bypass, "Group Bypass", User, Alarm),
    ev(575, Bypass, "Swinger Bypass", Zone, Alarm),
    ev(576, Bypass, "Access zone shunt", Zone, Alarm),
    ev(577, Bypass, "Access point bypass", Zone, Alarm),
    ev(578, Bypass, "Vault Bypass", Zone, Alarm),
    ev(579, Bypass, "Vent Bypass", Zone, Alarm),
    ev(601, TestMisc, "Manual trigger test report", Zone, Alarm),
    ev(602, TestMisc, "Periodic test report", Zone, Alarm),
    ev(603, TestMisc, "Periodic RF transmission", Zone, Alarm),
    ev(604, TestMisc, "Fire test", User, Alarm),
    ev(605, TestMisc, "Status report to follow", Zone, Alarm),
    ev(606, TestMisc, "Listen-in to follow", Zone, Alarm),
    ev(607, TestMisc, "Walk test mode", User, Alarm),
    ev(608, TestMisc, "System Trouble Present", Zone, Alarm),
    ev(609, TestMisc, "Video Transmitter active", Zone, Alarm),
    ev(611, TestMisc, "Point tested OK", Zone, Alarm),
    ev(612, TestMisc, "Point not tested", Zone, Alarm),
    ev(613, TestMisc, "Intrusion Zone Walk Tested", Zone, Alarm),
    ev(614, TestMisc, "Fire Zone Walk Tested", Zone, Alarm),
    ev(615, TestMisc, "Panic Zone Walk Tested", Zone, Alarm),
    ev(616, TestMisc, "Trouble Service Request", Zone, Alarm),
    ev(621, EventLog, "Event Log reset", Zone, Alarm),
    ev(622, EventLog, "Event Log 50% full", Zone, Alarm),
    ev(623, EventLog, "Event Log 90% full", Zone, Alarm),
    ev(624, EventLog, "Event Log overflow", Zone, Alarm),
    ev(625, EventLog, "Time/Date reset", User, Alarm),
    ev(626, EventLog, "Time/Date inaccurate", Zone, Alarm),
    ev(627, EventLog, "Program mode entry", Zone, Alarm),
    ev(628, EventLog, "Program mode exit", Zone, Alarm),
    ev(629, EventLog, "32 Hour Event log marker", Zone, Alarm),
    ev(630, Scheduling, "Schedule change", Zone, Alarm),
    ev(631, Scheduling, "Exception schedule change", Zone, Alarm),
    ev(632, Scheduling, "Access schedule change", Zone, Alarm),
    ev(641, PersonnelMonitoring, "Senior Person Watch Trouble (No movement)", Zone, Alarm),
    ev(642, PersonnelMonitoring, "Latch-key Supervision", User, Alarm),
    ev(651, Miscellaneous, "Identifies ADT Authorized Dealer", Zone, Alarm),
    ev(652, Miscellaneous, "Reserved for ADEMCO Use", User, Alarm),
    ev(653, Miscellaneous, "Reserved for ADEMCO Use", User, Alarm),
    ev(654, Miscellaneous, "System Inactivity", Zone, Alarm),
    ev(703, Miscellaneous, "Auxiliary #3", Zone, Alarm),
    ev(704, Miscellaneous, "Installer Test", Zone, Alarm),
    ev(796, Miscellaneous, "Unable to output signal (Derived Channel)", Zone, Alarm),
    ev(798, Miscellaneous, "STU Controller down (Derived Channel)", Zone, Alarm),
    ev(900, Miscellaneous, "Download Abort Downloader", Id, Alarm),
    ev(901, Miscellaneous, "Download Start/End", Id, Alarm),
    ev(902, Miscellaneous, "Download Interrupted", Id, Alarm),
    ev(910, Miscellaneous, "Auto-close with Bypass", Zone, Alarm),
    ev(911, Miscellaneous, "Bypass Closing", Zone, Alarm),
    ev(912, Miscellaneous, "Fire Alarm Silenced", Id, Alarm),
    ev(913, Miscellaneous, "Supervisory Point test Start/End", User, Alarm),
    ev(914, Miscellaneous, "Hold-up test Start/End", User, Alarm),
    ev(915, Miscellaneous, "Burglary Test Print Start/End", Id, Alarm),
    ev(916, Miscellaneous, "Supervisory Point test Start/End", Id, Alarm),
    ev(917, Miscellaneous, "Burg. Diagnostics Start/End", Zone, Alarm),
    ev(918, Miscellaneous, "Fire Diagnostics Start/End", Zone, Alarm),
    ev(919, Miscellaneous, "Untyped diagnostics", Zone, Alarm),
    ev(920, Miscellaneous, "Trouble Closing (closed with burg. During exit)", User, Alarm),
    ev(921, Miscellaneous, "Access Denied Code Unknown", User, Alarm),
    ev(922, Miscellaneous, "Supervisory Point Alarm", Zone, Alarm),
    ev(923, Miscellaneous, "Supervisory Point Bypass", Zone, Alarm),
    ev(924, Miscellaneous, "Supervisory Point Trouble", Zone, Alarm),
    ev(925, Miscellaneous, "Hold-up Point Bypass", Zone, Alarm),
    ev(926, Miscellaneous, "AC Failure for 4 hours", Zone, Alarm),
    ev(927, Miscellaneous, "Output Trouble", Zone, Alarm),
    ev(928, Miscellaneous, "User code for event", User, Alarm),
    ev(929, Miscellaneous, "Log-off", User, Alarm),
    ev(954, Miscellaneous, "Call Center Connection Failure", Id, Alarm),
    ev(961, Miscellaneous, "Receiver Database Connection Fail/Restore", Id, Alarm),
    ev(962, Miscellaneous, "License Expiration Notify", Id, Alarm),
    ev(999, Miscellaneous, "1 and 1/3 day no read log event", Id, Alarm),
];
